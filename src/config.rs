use crate::error::AppError;
use crate::filesystem::{get_app_data_dir, get_export_base_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional configuration file inside the app data directory
pub const CONFIG_FILE_NAME: &str = "photojournal.toml";

/// Where the journal keeps its database, photos and exports.
///
/// Every key is optional in the TOML file; missing keys keep the platform default.
///
/// ```toml
/// database_path = "/home/me/journal/photojournal.db"
/// photos_dir = "/home/me/journal/photos"
/// export_dir = "/home/me/Backups"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub photos_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = get_app_data_dir();
        Self {
            database_path: data_dir.join("photojournal.db"),
            photos_dir: data_dir.join("photos"),
            export_dir: get_export_base_dir(),
        }
    }
}

impl AppConfig {
    /// Everything below one directory (used for tests and portable installs)
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            database_path: dir.join("photojournal.db"),
            photos_dir: dir.join("photos"),
            export_dir: dir.join("exports"),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads `path` if given (it must exist), otherwise the default config file
    /// when present, otherwise the platform defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (get_app_data_dir().join(CONFIG_FILE_NAME), false),
        };

        if !path.exists() {
            if required {
                return Err(AppError::Config(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
