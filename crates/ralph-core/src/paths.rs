//! Dashboard configuration paths.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Directory name under the user's home directory.
const CONFIG_DIR_NAME: &str = ".ralph-dashboard";

/// Settings file name inside the configuration directory.
const CONFIG_FILE_NAME: &str = "config.json";

/// Errors that can occur during path resolution and directory operations.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the user's home directory.
    #[error("Cannot determine home directory")]
    NoHomeDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// `~/.ralph-dashboard`
pub fn config_dir() -> Result<PathBuf, PathError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(PathError::NoHomeDir)
}

/// `~/.ralph-dashboard/config.json`
pub fn config_file_path() -> Result<PathBuf, PathError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Create the configuration directory if needed and return it.
pub fn ensure_config_dir() -> Result<PathBuf, PathError> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir).map_err(|e| PathError::CreateFailed {
        path: dir.clone(),
        reason: e.to_string(),
    })?;
    Ok(dir)
}
