//! The archive container: a deflate zip with `data.json` first, then `photos/<name>` entries.

use crate::error::FormatError;
use crate::models::{ArchiveManifest, MANIFEST_PATH, PHOTOS_PREFIX};
use std::collections::HashSet;
use std::io::{Read, Seek, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Highest `export_version` major this build understands
const SUPPORTED_MAJOR: u32 = 1;

fn asset_path(name: &str) -> String {
    format!("{}{}", PHOTOS_PREFIX, name)
}

/// Streaming writer for one archive.
///
/// The manifest must be written before any asset.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    manifest_written: bool,
    assets: HashSet<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            manifest_written: false,
            assets: HashSet::new(),
        }
    }

    pub fn write_manifest(&mut self, manifest: &ArchiveManifest) -> Result<(), FormatError> {
        if self.manifest_written {
            return Err(FormatError::Io(format!("{} already written", MANIFEST_PATH)));
        }

        let json = serde_json::to_vec_pretty(manifest).map_err(|e| {
            FormatError::Io(format!("Failed to serialize {}: {}", MANIFEST_PATH, e))
        })?;
        self.zip.start_file(MANIFEST_PATH, self.options)?;
        self.zip.write_all(&json)?;
        self.manifest_written = true;

        log::debug!(
            "Wrote {} with {} records ({} bytes)",
            MANIFEST_PATH,
            manifest.entries.len(),
            json.len()
        );
        Ok(())
    }

    /// Writes `bytes` as `photos/<name>`
    pub fn write_asset(&mut self, name: &str, bytes: &[u8]) -> Result<(), FormatError> {
        if !self.manifest_written {
            return Err(FormatError::Io(format!(
                "{} must be written before assets",
                MANIFEST_PATH
            )));
        }
        if !self.assets.insert(name.to_string()) {
            return Err(FormatError::Io(format!("Duplicate asset name {}", name)));
        }

        self.zip.start_file(asset_path(name), self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    pub fn finish(self) -> Result<W, FormatError> {
        if !self.manifest_written {
            return Err(FormatError::Io(format!("{} was never written", MANIFEST_PATH)));
        }
        Ok(self.zip.finish()?)
    }
}

/// Which assets [`encode`] stored and which were unavailable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Encodes a complete archive.
///
/// `asset_source` is asked once per distinct photo name in manifest order.
/// Returning `None`, or a reader that fails, skips that asset: the record
/// stays in the manifest and the importer treats the photo as unavailable.
pub fn encode<W, R, F>(
    writer: W,
    manifest: &ArchiveManifest,
    mut asset_source: F,
) -> Result<(W, EncodeReport), FormatError>
where
    W: Write + Seek,
    R: Read,
    F: FnMut(&str) -> Option<R>,
{
    let mut archive = ArchiveWriter::new(writer);
    archive.write_manifest(manifest)?;

    let mut report = EncodeReport::default();
    for name in manifest.photo_filenames() {
        let Some(mut reader) = asset_source(name) else {
            report.skipped.push(name.to_string());
            continue;
        };

        // Buffer first so a failing source never leaves a half-written entry.
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            log::warn!("Failed to read photo {}: {}", name, e);
            report.skipped.push(name.to_string());
            continue;
        }

        archive.write_asset(name, &bytes)?;
        report.written.push(name.to_string());
    }

    Ok((archive.finish()?, report))
}

/// Read access to an archive that passed the container gate.
pub struct ArchiveReader<R: Read + Seek> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> std::fmt::Debug for ArchiveReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("entries", &self.zip.len())
            .finish()
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Opens the container and checks that it holds a manifest.
    ///
    /// Nothing is extracted here; both checks only look at the central directory.
    pub fn open(reader: R) -> Result<Self, FormatError> {
        let zip = ZipArchive::new(reader)
            .map_err(|e| FormatError::CorruptContainer(e.to_string()))?;

        if !zip.file_names().any(|name| name == MANIFEST_PATH) {
            return Err(FormatError::MissingManifest);
        }

        Ok(Self { zip })
    }

    /// Opens and decodes in one step
    pub fn decode(reader: R) -> Result<(ArchiveManifest, Self), FormatError> {
        let mut archive = Self::open(reader)?;
        let manifest = archive.read_manifest()?;
        Ok((manifest, archive))
    }

    pub fn read_manifest(&mut self) -> Result<ArchiveManifest, FormatError> {
        let mut file = self.zip.by_name(MANIFEST_PATH).map_err(|e| match e {
            ZipError::FileNotFound => FormatError::MissingManifest,
            other => FormatError::UnparseableManifest(other.to_string()),
        })?;

        let mut text = String::new();
        file.read_to_string(&mut text)
            .map_err(|e| FormatError::UnparseableManifest(e.to_string()))?;

        let manifest: ArchiveManifest = serde_json::from_str(&text)
            .map_err(|e| FormatError::UnparseableManifest(e.to_string()))?;

        match manifest.format_major() {
            Some(major) if major <= SUPPORTED_MAJOR => Ok(manifest),
            _ => Err(FormatError::UnsupportedVersion(manifest.export_version)),
        }
    }

    pub fn has_asset(&self, name: &str) -> bool {
        let path = asset_path(name);
        self.zip.file_names().any(|n| n == path)
    }

    /// Names of all entries under `photos/`
    pub fn asset_names(&self) -> Vec<String> {
        self.zip
            .file_names()
            .filter_map(|n| n.strip_prefix(PHOTOS_PREFIX))
            .filter(|n| !n.is_empty() && !n.ends_with('/'))
            .map(str::to_string)
            .collect()
    }

    /// Streams `photos/<name>` into `out`; `Ok(None)` if the archive lacks it
    pub fn copy_asset<W: Write>(
        &mut self,
        name: &str,
        out: &mut W,
    ) -> Result<Option<u64>, FormatError> {
        match self.zip.by_name(&asset_path(name)) {
            Ok(mut file) => Ok(Some(std::io::copy(&mut file, out)?)),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read_asset(&mut self, name: &str) -> Result<Option<Vec<u8>>, FormatError> {
        let mut bytes = Vec::new();
        Ok(self.copy_asset(name, &mut bytes)?.map(|_| bytes))
    }
}
