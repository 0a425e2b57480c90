use crate::codec::ArchiveReader;
use crate::error::{FormatError, ImportError};
use crate::models::{ArchiveManifest, ArchiveRecord, JournalEntry};
use crate::store::{AssetStore, EntryStore, JPEG_MIME_TYPE};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Seek, Write};

/// How an import treats the entries already in the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing entries and add the imported ones
    Add,
    /// Delete every existing entry first
    Overwrite,
}

/// Steps of an import, in order. `ClearingStore` only happens in [`ImportMode::Overwrite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Validating,
    ParsingManifest,
    ClearingStore,
    MaterializingEntries,
    Done,
}

/// Outcome counts of a finished import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub entries_imported: usize,
    pub photos_imported: usize,
    /// Records that named a photo which could not be restored
    pub photos_missing: usize,
}

fn enter(stage: &mut ImportStage, next: ImportStage) {
    log::debug!("Import stage {:?} -> {:?}", stage, next);
    *stage = next;
}

/// Imports an archive into `store`, restoring photos into `assets`.
///
/// Structural problems (not a zip, no or broken manifest) abort before the
/// store is touched. A photo that is missing from the archive or cannot be
/// written becomes an entry without photo; the import goes on. Store
/// failures abort, and whatever was already cleared or inserted stays so.
pub fn import_archive<R, S, A>(
    reader: R,
    mode: ImportMode,
    store: &mut S,
    assets: &mut A,
) -> Result<ImportSummary, ImportError>
where
    R: Read + Seek,
    S: EntryStore,
    A: AssetStore,
{
    let mut stage = ImportStage::Validating;
    log::debug!("Import stage {:?} ({:?} mode)", stage, mode);
    let mut archive = ArchiveReader::open(reader).map_err(ImportError::InvalidArchive)?;

    enter(&mut stage, ImportStage::ParsingManifest);
    let manifest = archive
        .read_manifest()
        .map_err(ImportError::UnparseableManifest)?;
    let timestamps = record_timestamps(&manifest).map_err(ImportError::UnparseableManifest)?;
    log::debug!(
        "Manifest version {} from app {} with {} records",
        manifest.export_version,
        manifest.app_version,
        manifest.entries.len()
    );

    if mode == ImportMode::Overwrite {
        enter(&mut stage, ImportStage::ClearingStore);
        store
            .delete_all()
            .map_err(|e| ImportError::Store(format!("Failed to clear entries: {}", e)))?;
    }

    enter(&mut stage, ImportStage::MaterializingEntries);
    let display_name = format!("imported_{}", Local::now().format("%Y-%m-%d-%H-%M-%S"));
    let mut summary = ImportSummary::default();

    for (record, created_at) in manifest.entries.iter().zip(timestamps) {
        let photo_ref = if record.has_photo() {
            match materialize_photo(&mut archive, assets, record, &display_name) {
                Some(asset_ref) => {
                    summary.photos_imported += 1;
                    asset_ref
                }
                None => {
                    summary.photos_missing += 1;
                    String::new()
                }
            }
        } else {
            String::new()
        };

        if record.has_partial_location() {
            log::warn!(
                "Record {} has only one coordinate, importing without location",
                record.id
            );
        }

        let entry = JournalEntry {
            id: None,
            text: record.text.clone(),
            photo_ref,
            created_at,
            location: record.location(),
        };
        store.insert(&entry).map_err(|e| {
            ImportError::Store(format!(
                "Failed to insert entry {} after {} imported: {}",
                record.id, summary.entries_imported, e
            ))
        })?;
        summary.entries_imported += 1;
    }

    enter(&mut stage, ImportStage::Done);
    log::info!(
        "Import finished: {} entries, {} photos, {} photos missing",
        summary.entries_imported,
        summary.photos_imported,
        summary.photos_missing
    );
    Ok(summary)
}

/// Checks every timestamp before anything is written to the store
fn record_timestamps(manifest: &ArchiveManifest) -> Result<Vec<DateTime<Utc>>, FormatError> {
    manifest
        .entries
        .iter()
        .map(|record| {
            record.created_at().ok_or_else(|| {
                FormatError::UnparseableManifest(format!(
                    "entry {} has out-of-range timestamp {}",
                    record.id, record.timestamp
                ))
            })
        })
        .collect()
}

/// Copies the record's photo into a freshly created asset; `None` on any failure
fn materialize_photo<R, A>(
    archive: &mut ArchiveReader<R>,
    assets: &mut A,
    record: &ArchiveRecord,
    display_name: &str,
) -> Option<String>
where
    R: Read + Seek,
    A: AssetStore,
{
    let name = record.photo_filename.as_str();
    if !archive.has_asset(name) {
        log::warn!("Photo {} is not in the archive, importing entry without photo", name);
        return None;
    }

    let asset_ref = match assets.create_new_asset(display_name, JPEG_MIME_TYPE) {
        Ok(asset_ref) => asset_ref,
        Err(e) => {
            log::warn!("Failed to create asset for photo {}: {}", name, e);
            return None;
        }
    };

    let copied = assets
        .open_for_write(&asset_ref)
        .map_err(FormatError::from)
        .and_then(|mut writer| {
            let bytes = archive.copy_asset(name, &mut writer)?;
            writer.flush()?;
            Ok(bytes)
        });

    match copied {
        Ok(Some(bytes)) => {
            log::debug!("Restored photo {} as {} ({} bytes)", name, asset_ref, bytes);
            Some(asset_ref)
        }
        Ok(None) => {
            log::warn!("Photo {} vanished from the archive", name);
            discard(assets, &asset_ref);
            None
        }
        Err(e) => {
            log::warn!("Failed to restore photo {}: {}", name, e);
            discard(assets, &asset_ref);
            None
        }
    }
}

fn discard<A: AssetStore>(assets: &mut A, asset_ref: &str) {
    if let Err(e) = assets.discard(asset_ref) {
        log::warn!("Failed to discard partial asset {}: {}", asset_ref, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ArchiveWriter;
    use crate::export::export_archive;
    use crate::models::NO_PHOTO_SENTINEL;
    use crate::test_support::{MemoryAssetStore, MemoryEntryStore};
    use std::io::Cursor;

    fn entry(text: &str, millis: i64) -> JournalEntry {
        JournalEntry::new(text, DateTime::from_timestamp_millis(millis).unwrap())
    }

    fn record(id: i64, photo: &str) -> ArchiveRecord {
        ArchiveRecord {
            id,
            text: format!("record {}", id),
            photo_filename: photo.to_string(),
            timestamp: 1756052557311,
            latitude: None,
            longitude: None,
        }
    }

    fn archive_with(records: Vec<ArchiveRecord>, photos: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        writer
            .write_manifest(&ArchiveManifest::new("0.2", records))
            .unwrap();
        for (name, bytes) in photos {
            writer.write_asset(name, bytes).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    fn export_bytes(entries: &[JournalEntry], assets: &mut MemoryAssetStore) -> Cursor<Vec<u8>> {
        let (mut cursor, _) =
            export_archive(entries, assets, Cursor::new(Vec::new()), "0.2").unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let entries = vec![
            entry("terribile \nmild pecorino with truffles. \n", 1755813502803)
                .with_photo("content://media/1000000255")
                .with_location(42.42302267, -71.19617533),
            entry("🍷 Château Margaux — «très bon» 日本酒 שלום", 1755732831390)
                .with_location(-33.868820123, 151.209295987),
            entry("", 1755729432550).with_photo("content://media/1000000243"),
            entry("no photo, no place", 1).with_photo(""),
        ];
        let mut source_assets = MemoryAssetStore::default()
            .with_photo("content://media/1000000255", b"first jpeg")
            .with_photo("content://media/1000000243", b"second jpeg");
        let archive = export_bytes(&entries, &mut source_assets);

        let mut store = MemoryEntryStore::default();
        let mut assets = MemoryAssetStore::default();
        let summary = import_archive(archive, ImportMode::Add, &mut store, &mut assets).unwrap();

        assert_eq!(summary.entries_imported, 4);
        assert_eq!(summary.photos_imported, 2);
        assert_eq!(summary.photos_missing, 0);

        for original in &entries {
            let imported = store
                .entries
                .iter()
                .find(|e| e.created_at == original.created_at)
                .unwrap();
            assert_eq!(imported.text, original.text);
            assert_eq!(imported.location, original.location);
            assert_eq!(imported.has_photo(), original.has_photo());
        }

        let with_photo = store.entries.iter().find(|e| e.text.starts_with("terribile")).unwrap();
        assert!(with_photo.photo_ref.starts_with("mem://imported_"));
        assert_eq!(assets.bytes(&with_photo.photo_ref), Some(b"first jpeg".to_vec()));
    }

    #[test]
    fn test_single_entry_scenario() {
        let source = entry("terribile\nmild pecorino", 1755813502803)
            .with_photo("content://media/1000000255")
            .with_location(42.42302267, -71.19617533);
        let mut source_assets =
            MemoryAssetStore::default().with_photo("content://media/1000000255", b"\xFF\xD8");
        let archive = export_bytes(&[source.clone()], &mut source_assets);

        let mut store = MemoryEntryStore::default();
        let mut assets = MemoryAssetStore::default();
        let summary = import_archive(archive, ImportMode::Add, &mut store, &mut assets).unwrap();

        assert_eq!(summary.entries_imported, 1);
        assert_eq!(summary.photos_imported, 1);
        let imported = &store.entries[0];
        assert_eq!(imported.id, Some(1));
        assert_eq!(imported.text, source.text);
        assert_eq!(imported.created_at, source.created_at);
        let loc = imported.location.unwrap();
        assert!((loc.latitude - 42.42302267).abs() < 1e-8);
        assert!((loc.longitude + 71.19617533).abs() < 1e-8);
    }

    #[test]
    fn test_missing_photo_is_tolerated() {
        let archive = archive_with(vec![record(1, "x.jpg")], &[]);
        let mut store = MemoryEntryStore::default();
        let mut assets = MemoryAssetStore::default();

        let summary = import_archive(archive, ImportMode::Add, &mut store, &mut assets).unwrap();
        assert_eq!(summary.entries_imported, 1);
        assert_eq!(summary.photos_imported, 0);
        assert_eq!(summary.photos_missing, 1);
        assert_eq!(store.entries[0].photo_ref, "");
    }

    #[test]
    fn test_failed_asset_write_is_discarded() {
        let archive = archive_with(vec![record(1, "a.jpg")], &[("a.jpg", b"bytes")]);
        let mut store = MemoryEntryStore::default();
        let mut assets = MemoryAssetStore {
            fail_writes: true,
            ..Default::default()
        };

        let summary = import_archive(archive, ImportMode::Add, &mut store, &mut assets).unwrap();
        assert_eq!(summary.entries_imported, 1);
        assert_eq!(summary.photos_imported, 0);
        assert_eq!(store.entries[0].photo_ref, "");
        assert_eq!(assets.discarded.len(), 1);
        assert!(assets.blobs.borrow().is_empty());
    }

    #[test]
    fn test_add_keeps_existing_entries() {
        let mut store = MemoryEntryStore::with_entries(vec![entry("old", 5)]);
        let archive = archive_with(vec![record(1, NO_PHOTO_SENTINEL)], &[]);

        import_archive(archive, ImportMode::Add, &mut store, &mut MemoryAssetStore::default())
            .unwrap();
        assert_eq!(store.entries.len(), 2);
        assert_eq!(store.entries[1].id, Some(2));
    }

    #[test]
    fn test_overwrite_clears_existing_entries() {
        let mut store = MemoryEntryStore::with_entries(vec![entry("old", 5), entry("older", 4)]);
        let archive = archive_with(vec![record(1, NO_PHOTO_SENTINEL)], &[]);

        let summary = import_archive(
            archive,
            ImportMode::Overwrite,
            &mut store,
            &mut MemoryAssetStore::default(),
        )
        .unwrap();
        assert_eq!(summary.entries_imported, 1);
        assert_eq!(store.entries.len(), 1);
        assert_eq!(store.entries[0].text, "record 1");
    }

    #[test]
    fn test_invalid_archive_leaves_store_untouched() {
        let mut store = MemoryEntryStore::with_entries(vec![entry("keep me", 5)]);
        let result = import_archive(
            Cursor::new(b"This is not a ZIP file".to_vec()),
            ImportMode::Overwrite,
            &mut store,
            &mut MemoryAssetStore::default(),
        );

        assert!(matches!(
            result,
            Err(ImportError::InvalidArchive(FormatError::CorruptContainer(_)))
        ));
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_bad_timestamp_aborts_before_clearing() {
        let mut bad = record(2, NO_PHOTO_SENTINEL);
        bad.timestamp = i64::MAX;
        let archive = archive_with(vec![record(1, NO_PHOTO_SENTINEL), bad], &[]);
        let mut store = MemoryEntryStore::with_entries(vec![entry("keep me", 5)]);

        let result = import_archive(
            archive,
            ImportMode::Overwrite,
            &mut store,
            &mut MemoryAssetStore::default(),
        );
        assert!(matches!(result, Err(ImportError::UnparseableManifest(_))));
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_empty_manifest_is_vacuous_success() {
        let archive = archive_with(Vec::new(), &[]);
        let mut store = MemoryEntryStore::default();
        let summary =
            import_archive(archive, ImportMode::Add, &mut store, &mut MemoryAssetStore::default())
                .unwrap();
        assert_eq!(summary, ImportSummary::default());
    }

    #[test]
    fn test_store_failure_is_not_rolled_back() {
        let archive = archive_with(
            vec![record(1, NO_PHOTO_SENTINEL), record(2, NO_PHOTO_SENTINEL)],
            &[],
        );
        let mut store = MemoryEntryStore {
            fail_insert_after: Some(1),
            ..Default::default()
        };

        let result =
            import_archive(archive, ImportMode::Add, &mut store, &mut MemoryAssetStore::default());
        assert!(matches!(result, Err(ImportError::Store(_))));
        assert_eq!(store.entries.len(), 1);
    }

    #[test]
    fn test_partial_location_imports_without_location() {
        let mut lone = record(1, NO_PHOTO_SENTINEL);
        lone.latitude = Some(12.5);
        let archive = archive_with(vec![lone], &[]);
        let mut store = MemoryEntryStore::default();

        import_archive(archive, ImportMode::Add, &mut store, &mut MemoryAssetStore::default())
            .unwrap();
        assert_eq!(store.entries[0].location, None);
    }
}
