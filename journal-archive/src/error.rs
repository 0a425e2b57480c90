use std::fmt;

/// Errors of the archive container itself
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The bytes are not a readable zip archive
    CorruptContainer(String),
    /// The archive has no `data.json`
    MissingManifest,
    /// `data.json` exists but is not a valid manifest
    UnparseableManifest(String),
    /// The manifest was written by a newer, incompatible archive format
    UnsupportedVersion(String),
    /// Reading or writing an archive entry failed
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::CorruptContainer(msg) => write!(f, "corrupt container: {}", msg),
            FormatError::MissingManifest => write!(f, "missing manifest"),
            FormatError::UnparseableManifest(msg) => write!(f, "unparseable manifest: {}", msg),
            FormatError::UnsupportedVersion(v) => {
                write!(f, "unsupported archive format version {}", v)
            }
            FormatError::Io(msg) => write!(f, "archive I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<zip::result::ZipError> for FormatError {
    fn from(e: zip::result::ZipError) -> Self {
        FormatError::Io(e.to_string())
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}

/// Errors that abort a whole export
#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    /// The store holds no entries; no archive is produced
    NothingToExport,
    /// Reading entries or writing the archive failed
    Write(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportError::NothingToExport => write!(f, "No entries to export"),
            ExportError::Write(msg) => write!(f, "Export failed: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<FormatError> for ExportError {
    fn from(e: FormatError) -> Self {
        ExportError::Write(e.to_string())
    }
}

/// Errors that abort a whole import
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The container failed validation (not a zip, or no manifest)
    InvalidArchive(FormatError),
    /// The manifest could not be decoded into the expected shape
    UnparseableManifest(FormatError),
    /// Clearing or inserting into the entry store failed
    Store(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::InvalidArchive(e) => write!(f, "Invalid archive: {}", e),
            ImportError::UnparseableManifest(e) => write!(f, "Failed to parse data.json: {}", e),
            ImportError::Store(msg) => write!(f, "Import failed: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::InvalidArchive(e) | ImportError::UnparseableManifest(e) => Some(e),
            ImportError::Store(_) => None,
        }
    }
}
