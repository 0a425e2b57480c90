use journal_archive::{ExportError, ImportError};
use std::fmt;

/// Central error types for the photo journal
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Invalid or unreadable configuration file
    Config(String),
    /// Resource not found
    NotFound(String),
    /// Export aborted (nothing to export, archive not writable)
    Export(ExportError),
    /// Import aborted (invalid archive, broken manifest, store failure)
    Import(ImportError),
    /// General error
    #[allow(dead_code)]
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Export(e) => write!(f, "{}", e),
            AppError::Import(e) => write!(f, "{}", e),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Export(e)
    }
}

impl From<ImportError> for AppError {
    fn from(e: ImportError) -> Self {
        AppError::Import(e)
    }
}

/// User-friendly error messages for UI
impl AppError {
    #[allow(dead_code)]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Config(msg) => format!("The configuration file is invalid: {}", msg),
            AppError::NotFound(msg) => format!("{} was not found.", msg),
            AppError::Export(ExportError::NothingToExport) => {
                "There are no entries to export yet.".to_string()
            }
            AppError::Export(_) => "The export file could not be written.".to_string(),
            AppError::Import(ImportError::InvalidArchive(_)) => {
                "This file is not a photo journal export.".to_string()
            }
            AppError::Import(ImportError::UnparseableManifest(_)) => {
                "The export file is damaged or from a newer app version.".to_string()
            }
            AppError::Import(ImportError::Store(_)) => {
                "Saving the imported entries failed. Some entries may be missing.".to_string()
            }
            AppError::Other(msg) => msg.clone(),
        }
    }
}
