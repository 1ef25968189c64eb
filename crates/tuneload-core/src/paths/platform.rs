//! Data root detection and directory layout.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "TUNELOAD_DATA_DIR";

const APP_DIR: &str = "tuneload";
const DOWNLOADS_DIR: &str = "downloads";
const DATABASE_FILE: &str = "tuneload.db";

/// Root directory for tuneload data.
///
/// `$TUNELOAD_DATA_DIR` wins when set and non-empty; otherwise
/// `<platform data dir>/tuneload`. Nothing is created.
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(value) = env::var(DATA_DIR_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(PathError::NoDataDir)
}

/// Directory for finished downloads under `root`, created if missing.
pub fn downloads_dir(root: &Path) -> Result<PathBuf, PathError> {
    let dir = root.join(DOWNLOADS_DIR);
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Path to the database file under `root`. The root is created if missing.
pub fn database_path(root: &Path) -> Result<PathBuf, PathError> {
    ensure_dir(root)?;
    Ok(root.join(DATABASE_FILE))
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
