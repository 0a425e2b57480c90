use journal_archive::{AssetStore, JPEG_MIME_TYPE};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Photo storage in a plain directory.
///
/// References are file names relative to the photos directory. Absolute paths
/// and `file://` URIs are accepted for reading, so entries captured elsewhere
/// can still be exported.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[allow(dead_code)]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the absolute path to a photo (for UI display)
    pub fn resolve(&self, asset_ref: &str) -> PathBuf {
        let path = asset_ref.strip_prefix("file://").unwrap_or(asset_ref);
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Stores `bytes` as a new photo and returns its reference
    #[allow(dead_code)]
    pub fn add_photo(&mut self, display_name: &str, bytes: &[u8]) -> io::Result<String> {
        let asset_ref = self.create_new_asset(display_name, JPEG_MIME_TYPE)?;
        fs::write(self.resolve(&asset_ref), bytes)?;
        Ok(asset_ref)
    }
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

fn sanitize_display_name(display_name: &str) -> String {
    let name: String = display_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        "photo".to_string()
    } else {
        name
    }
}

impl AssetStore for FsAssetStore {
    type Reader = BufReader<File>;
    type Writer = BufWriter<File>;

    fn open_for_read(&mut self, asset_ref: &str) -> io::Result<Self::Reader> {
        Ok(BufReader::new(File::open(self.resolve(asset_ref))?))
    }

    fn create_new_asset(&mut self, display_name: &str, mime_type: &str) -> io::Result<String> {
        fs::create_dir_all(&self.root)?;

        let asset_ref = format!(
            "{}-{}.{}",
            sanitize_display_name(display_name),
            Uuid::new_v4().simple(),
            extension_for(mime_type)
        );
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.root.join(&asset_ref))?;

        log::debug!("Created photo asset {}", asset_ref);
        Ok(asset_ref)
    }

    fn open_for_write(&mut self, asset_ref: &str) -> io::Result<Self::Writer> {
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.resolve(asset_ref))?;
        Ok(BufWriter::new(file))
    }

    fn discard(&mut self, asset_ref: &str) -> io::Result<()> {
        match fs::remove_file(self.resolve(asset_ref)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_create_write_read_asset() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(tmp.path().join("photos"));

        let asset_ref = store
            .create_new_asset("imported_2025-08-21-10-00-00", JPEG_MIME_TYPE)
            .unwrap();
        assert!(asset_ref.starts_with("imported_2025-08-21-10-00-00-"));
        assert!(asset_ref.ends_with(".jpg"));

        let mut writer = store.open_for_write(&asset_ref).unwrap();
        writer.write_all(b"\xFF\xD8 jpeg").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut bytes = Vec::new();
        store
            .open_for_read(&asset_ref)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(bytes, b"\xFF\xD8 jpeg");
    }

    #[test]
    fn test_new_assets_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(tmp.path());
        let a = store.create_new_asset("same", JPEG_MIME_TYPE).unwrap();
        let b = store.create_new_asset("same", JPEG_MIME_TYPE).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_absolute_and_file_uri() {
        let store = FsAssetStore::new("/photos");
        assert_eq!(store.resolve("a.jpg"), PathBuf::from("/photos/a.jpg"));
        assert_eq!(store.resolve("/tmp/b.jpg"), PathBuf::from("/tmp/b.jpg"));
        assert_eq!(store.resolve("file:///tmp/c.jpg"), PathBuf::from("/tmp/c.jpg"));
    }

    #[test]
    fn test_missing_asset_fails_to_open() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(tmp.path());
        assert!(store.open_for_read("gone.jpg").is_err());
    }

    #[test]
    fn test_discard_removes_file_and_tolerates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(tmp.path());
        let asset_ref = store.add_photo("x", b"data").unwrap();
        assert!(store.resolve(&asset_ref).exists());

        store.discard(&asset_ref).unwrap();
        assert!(!store.resolve(&asset_ref).exists());
        store.discard(&asset_ref).unwrap();
    }
}
