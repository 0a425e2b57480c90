// Export/Import service for full journal backups

use crate::config::AppConfig;
use crate::database::init_database;
use crate::error::AppError;
use crate::filesystem::ensure_parent_dir;
use crate::services::entry_service::{list_entries_newest_first, SqliteEntryStore};
use crate::services::photo_service::FsAssetStore;
use chrono::Utc;
use journal_archive::{export_archive, import_archive, ExportSummary, ImportSummary};
use rusqlite::Connection;
use serde::Serialize;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub use journal_archive::ImportMode;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Outcome of an export as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    pub success: bool,
    pub file_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ExportResult {
    fn succeeded(file_path: PathBuf) -> Self {
        Self {
            success: true,
            file_path: Some(file_path),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_path: None,
            error: Some(error.into()),
        }
    }

    /// Path on success, message on failure
    pub fn outcome(&self) -> Result<PathBuf, String> {
        match (&self.file_path, &self.error) {
            (Some(path), None) if self.success => Ok(path.clone()),
            (_, Some(error)) => Err(error.clone()),
            _ => Err("Export failed".to_string()),
        }
    }
}

/// Outcome of an import as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    pub success: bool,
    pub entries_imported: usize,
    pub photos_imported: usize,
    pub error: Option<String>,
}

impl ImportResult {
    fn succeeded(summary: &ImportSummary) -> Self {
        Self {
            success: true,
            entries_imported: summary.entries_imported,
            photos_imported: summary.photos_imported,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            entries_imported: 0,
            photos_imported: 0,
            error: Some(error.into()),
        }
    }

    /// `(entries, photos)` on success, message on failure
    pub fn outcome(&self) -> Result<(usize, usize), String> {
        match &self.error {
            None if self.success => Ok((self.entries_imported, self.photos_imported)),
            Some(error) => Err(error.clone()),
            None => Err("Import failed".to_string()),
        }
    }
}

/// Default file name for a new export, e.g. `photojournal_export_1756054738865.zip`
pub fn default_export_filename() -> String {
    format!("photojournal_export_{}.zip", Utc::now().timestamp_millis())
}

/// Writes every entry and its photo into a zip at `export_path`.
///
/// On failure the partially written file is removed, so an empty journal
/// never leaves an archive behind.
pub fn export_to_zip(
    conn: &Connection,
    assets: &mut FsAssetStore,
    export_path: &Path,
) -> Result<ExportSummary, AppError> {
    let entries = list_entries_newest_first(conn)?;

    ensure_parent_dir(export_path)?;
    let file = fs::File::create(export_path)?;

    let result = export_archive(&entries, assets, BufWriter::new(file), APP_VERSION)
        .map_err(AppError::from)
        .and_then(|(mut writer, summary)| {
            writer.flush()?;
            Ok(summary)
        });

    if result.is_err() {
        if let Err(e) = fs::remove_file(export_path) {
            log::warn!(
                "Failed to remove incomplete export {}: {}",
                export_path.display(),
                e
            );
        }
    }

    result
}

/// Imports a zip created by [`export_to_zip`]; photos become new files in `assets`
pub fn import_from_zip(
    conn: &Connection,
    assets: &mut FsAssetStore,
    import_path: &Path,
    mode: ImportMode,
) -> Result<ImportSummary, AppError> {
    let file = fs::File::open(import_path)?;
    let mut store = SqliteEntryStore::new(conn);

    Ok(import_archive(
        BufReader::new(file),
        mode,
        &mut store,
        assets,
    )?)
}

/// Exports the journal described by `config` into its export directory
pub fn export_journal_blocking(config: &AppConfig) -> ExportResult {
    let export_path = config.export_dir.join(default_export_filename());

    let run = || -> Result<ExportSummary, AppError> {
        let conn = init_database(&config.database_path)?;
        let mut assets = FsAssetStore::new(&config.photos_dir);
        export_to_zip(&conn, &mut assets, &export_path)
    };

    match run() {
        Ok(summary) => {
            log::info!(
                "Exported {} entries ({} photos, {} skipped) to {}",
                summary.entries_exported,
                summary.photos_exported,
                summary.photos_skipped,
                export_path.display()
            );
            ExportResult::succeeded(export_path)
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            ExportResult::failed(e.to_string())
        }
    }
}

/// Imports `archive_path` into the journal described by `config`
pub fn import_journal_blocking(
    config: &AppConfig,
    archive_path: &Path,
    mode: ImportMode,
) -> ImportResult {
    let run = || -> Result<ImportSummary, AppError> {
        let conn = init_database(&config.database_path)?;
        let mut assets = FsAssetStore::new(&config.photos_dir);
        import_from_zip(&conn, &mut assets, archive_path, mode)
    };

    match run() {
        Ok(summary) => ImportResult::succeeded(&summary),
        Err(e) => {
            log::error!("Import of {} failed: {}", archive_path.display(), e);
            if mode == ImportMode::Overwrite
                && matches!(e, AppError::Import(journal_archive::ImportError::Store(_)))
            {
                log::warn!("Overwrite import did not complete, the journal may be partially cleared");
            }
            ImportResult::failed(e.to_string())
        }
    }
}

/// Runs the export on the blocking pool so the caller's thread stays responsive
pub async fn export_journal(config: &AppConfig) -> ExportResult {
    let config = config.clone();
    match tokio::task::spawn_blocking(move || export_journal_blocking(&config)).await {
        Ok(result) => result,
        Err(e) => ExportResult::failed(format!("Export failed: {}", e)),
    }
}

/// Runs the import on the blocking pool so the caller's thread stays responsive
pub async fn import_journal(
    config: &AppConfig,
    archive_path: &Path,
    mode: ImportMode,
) -> ImportResult {
    let config = config.clone();
    let archive_path = archive_path.to_path_buf();
    match tokio::task::spawn_blocking(move || {
        import_journal_blocking(&config, &archive_path, mode)
    })
    .await
    {
        Ok(result) => result,
        Err(e) => ImportResult::failed(format!("Import failed: {}", e)),
    }
}
