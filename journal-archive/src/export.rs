use crate::codec;
use crate::error::ExportError;
use crate::models::{ArchiveManifest, JournalEntry, NO_PHOTO_SENTINEL};
use crate::naming::AssetNamer;
use crate::store::AssetStore;
use std::io::{Seek, Write};

/// Outcome counts of a finished export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub entries_exported: usize,
    pub photos_exported: usize,
    /// Photos whose source could not be read; their records still name them
    pub photos_skipped: usize,
}

/// Writes `entries` (in the given order) and their photos as one archive into `writer`.
///
/// Unreadable photos are logged and left out of the archive, the export
/// continues. An empty entry list is rejected before anything is written.
pub fn export_archive<W, A>(
    entries: &[JournalEntry],
    assets: &mut A,
    writer: W,
    producer_version: &str,
) -> Result<(W, ExportSummary), ExportError>
where
    W: Write + Seek,
    A: AssetStore,
{
    if entries.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut namer = AssetNamer::new();
    let records = entries
        .iter()
        .map(|entry| {
            let name = if entry.has_photo() {
                namer.allocate(&entry.photo_ref)
            } else {
                NO_PHOTO_SENTINEL.to_string()
            };
            entry.to_record(name)
        })
        .collect();
    let manifest = ArchiveManifest::new(producer_version, records);

    log::debug!(
        "Exporting {} entries with {} distinct photos",
        manifest.entries.len(),
        namer.len()
    );

    let (writer, report) = codec::encode(writer, &manifest, |name| {
        let source = namer.source_for(name)?;
        match assets.open_for_read(source) {
            Ok(reader) => Some(reader),
            Err(e) => {
                log::warn!("Failed to export photo {}: {}", source, e);
                None
            }
        }
    })?;

    let summary = ExportSummary {
        entries_exported: manifest.entries.len(),
        photos_exported: report.written.len(),
        photos_skipped: report.skipped.len(),
    };
    log::info!(
        "Export finished: {} entries, {} photos, {} photos skipped",
        summary.entries_exported,
        summary.photos_exported,
        summary.photos_skipped
    );

    Ok((writer, summary))
}
