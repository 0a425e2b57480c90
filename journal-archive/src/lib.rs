//! # Journal Archive
//!
//! Portable export/import archives for a photo journal.
//!
//! An archive is a single deflate-compressed zip file holding:
//! - `data.json`: the manifest, describing every exported entry
//! - `photos/<name>`: one raw JPEG per distinct photo that could be read
//!
//! This crate provides:
//! - Collision-free asset naming for opaque photo references ([`AssetNamer`])
//! - The container codec ([`ArchiveWriter`], [`ArchiveReader`])
//! - The exporter and importer, generic over an [`EntryStore`] and an
//!   [`AssetStore`]
//! - A small Idle/InProgress/Success/Error tracker for UI reporting
//!
//! ## Platform Separation
//!
//! Nothing in here touches a database or decides where files live. The
//! application crate implements the two store traits (SQLite, a photos
//! directory, a media provider, ...) and hands them in.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use journal_archive::{export_archive, import_archive, ImportMode};
//!
//! let file = std::fs::File::create("photojournal_export.zip")?;
//! let entries = store.list_all_newest_first()?;
//! let (_file, summary) = export_archive(&entries, &mut assets, file, "0.2")?;
//!
//! let file = std::fs::File::open("photojournal_export.zip")?;
//! let summary = import_archive(file, ImportMode::Add, &mut store, &mut assets)?;
//! ```

pub mod codec;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod naming;
pub mod progress;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use codec::{encode, ArchiveReader, ArchiveWriter, EncodeReport};
pub use error::{ExportError, FormatError, ImportError};
pub use export::{export_archive, ExportSummary};
pub use import::{import_archive, ImportMode, ImportStage, ImportSummary};
pub use models::{
    ArchiveManifest, ArchiveRecord, GeoPoint, JournalEntry, FORMAT_VERSION, MANIFEST_PATH,
    NO_PHOTO_SENTINEL, PHOTOS_PREFIX,
};
pub use naming::{allocate_name, AssetNamer};
pub use progress::{OperationState, OperationTracker};
pub use store::{AssetStore, EntryStore, JPEG_MIME_TYPE};
