//! Snapshot location resolution
//!
//! Priority order:
//! 1. Explicit path from the caller (command-line argument)
//! 2. `data_file` in the TOML config file
//! 3. OS-dependent default under the user data directory

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory name used under the platform config and data directories
pub const APP_DIR: &str = "photo-collection";

/// Snapshot file name inside the default data directory
pub const DATA_FILE_NAME: &str = "collection.json";

/// Contents of `config.toml`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    pub data_file: Option<PathBuf>,
}

/// Resolve the snapshot path using the platform config file
pub fn resolve_data_file(cli_arg: Option<&Path>) -> PathBuf {
    resolve_with(cli_arg, config_file_path().as_deref())
}

/// Resolution with an explicit config file location
pub fn resolve_with(cli_arg: Option<&Path>, config_file: Option<&Path>) -> PathBuf {
    // Priority 1: explicit argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: config file
    if let Some(config) = config_file.and_then(load_file_config) {
        if let Some(data_file) = config.data_file {
            return data_file;
        }
    }

    // Priority 3: compiled default
    default_data_file()
}

/// Read a config file; a missing or malformed file yields `None`
pub fn load_file_config(path: &Path) -> Option<FileConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read config file, using defaults");
            return None;
        }
    };
    match toml::from_str::<FileConfig>(&text) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
            None
        }
    }
}

/// `<config_dir>/photo-collection/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `<data_dir>/photo-collection/collection.json`, falling back to the working directory
pub fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_FILE_NAME)
}
