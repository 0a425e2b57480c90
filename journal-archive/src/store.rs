//! Collaborator contracts: the entry store and the platform asset store.

use crate::models::JournalEntry;
use std::io::{Read, Write};

/// MIME type used for every photo created during import
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Narrow read/insert/clear view of the journal database
pub trait EntryStore {
    type Error: std::fmt::Display;

    /// All entries, newest first
    fn list_all_newest_first(&self) -> Result<Vec<JournalEntry>, Self::Error>;

    /// Inserts an entry, ignoring its `id`, and returns the id the store assigned
    fn insert(&mut self, entry: &JournalEntry) -> Result<i64, Self::Error>;

    fn delete_all(&mut self) -> Result<(), Self::Error>;
}

/// Capability-based access to platform-managed binary assets (photos).
///
/// References are opaque strings: a content URI, a relative file name, an
/// object key. The archive code never interprets them beyond naming.
pub trait AssetStore {
    type Reader: Read;
    type Writer: Write;

    fn open_for_read(&mut self, asset_ref: &str) -> std::io::Result<Self::Reader>;

    /// Allocates a new, empty asset and returns its reference
    fn create_new_asset(&mut self, display_name: &str, mime_type: &str)
        -> std::io::Result<String>;

    fn open_for_write(&mut self, asset_ref: &str) -> std::io::Result<Self::Writer>;

    /// Removes an asset that was created but could not be filled
    fn discard(&mut self, _asset_ref: &str) -> std::io::Result<()> {
        Ok(())
    }
}
