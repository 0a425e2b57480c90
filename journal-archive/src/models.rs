use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version of the archive layout itself, independent of the app version
pub const FORMAT_VERSION: &str = "1.0";

/// Reserved `photo_filename` meaning "this entry has no photo"
pub const NO_PHOTO_SENTINEL: &str = "null.jpg";

/// Path of the manifest inside the zip
pub const MANIFEST_PATH: &str = "data.json";

/// Folder prefix for photo assets inside the zip
pub const PHOTOS_PREFIX: &str = "photos/";

/// A latitude/longitude pair. Entries carry either both or neither.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point from the nullable wire pair; a lone coordinate yields `None`
    pub fn from_pair(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }
}

/// A journal entry as the store sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    /// Assigned by the store on insert; `None` for entries not yet persisted
    pub id: Option<i64>,
    pub text: String,
    /// Opaque reference into the platform asset store, empty for "no photo"
    pub photo_ref: String,
    pub created_at: DateTime<Utc>,
    pub location: Option<GeoPoint>,
}

impl JournalEntry {
    /// Creates a new, not yet persisted entry without photo or location
    pub fn new(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            text: text.into(),
            photo_ref: String::new(),
            created_at,
            location: None,
        }
    }

    pub fn with_photo(mut self, photo_ref: impl Into<String>) -> Self {
        self.photo_ref = photo_ref.into();
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(GeoPoint::new(latitude, longitude));
        self
    }

    pub fn has_photo(&self) -> bool {
        !self.photo_ref.is_empty()
    }

    /// Converts to the wire record, using `photo_filename` as the allocated asset name
    pub fn to_record(&self, photo_filename: impl Into<String>) -> ArchiveRecord {
        ArchiveRecord {
            id: self.id.unwrap_or_default(),
            text: self.text.clone(),
            photo_filename: photo_filename.into(),
            timestamp: self.created_at.timestamp_millis(),
            latitude: self.location.map(|p| p.latitude),
            longitude: self.location.map(|p| p.longitude),
        }
    }
}

/// One exported entry inside `data.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveRecord {
    /// Source id, kept for traceability only
    #[serde(default)]
    pub id: i64,
    pub text: String,
    pub photo_filename: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl ArchiveRecord {
    pub fn has_photo(&self) -> bool {
        self.photo_filename != NO_PHOTO_SENTINEL && !self.photo_filename.is_empty()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_pair(self.latitude, self.longitude)
    }

    /// True when exactly one of the two coordinates is set
    pub fn has_partial_location(&self) -> bool {
        self.latitude.is_some() != self.longitude.is_some()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Path of this record's photo inside the zip, if it has one
    pub fn asset_path(&self) -> Option<String> {
        self.has_photo()
            .then(|| format!("{}{}", PHOTOS_PREFIX, self.photo_filename))
    }
}

/// Root object of `data.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveManifest {
    #[serde(default = "default_format_version")]
    pub export_version: String,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub export_timestamp: i64,
    /// Producing application version, informational only
    #[serde(default)]
    pub app_version: String,
    pub entries: Vec<ArchiveRecord>,
}

fn default_format_version() -> String {
    FORMAT_VERSION.to_string()
}

impl ArchiveManifest {
    pub fn new(app_version: impl Into<String>, entries: Vec<ArchiveRecord>) -> Self {
        Self {
            export_version: FORMAT_VERSION.to_string(),
            export_timestamp: Utc::now().timestamp_millis(),
            app_version: app_version.into(),
            entries,
        }
    }

    /// Major component of `export_version`, `None` if it is not numeric
    pub fn format_major(&self) -> Option<u32> {
        self.export_version.split('.').next()?.trim().parse().ok()
    }

    /// Distinct non-sentinel photo names in manifest order
    pub fn photo_filenames(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .filter(|r| r.has_photo())
            .map(|r| r.photo_filename.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}
