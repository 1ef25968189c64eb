//! Resolve every tuneload path in one call.
//!
//! Backs the `tuneload paths` command and the CLI bootstrap.

use std::path::{Path, PathBuf};

use super::{PathError, data_root, database_path, downloads_dir};

/// All resolved paths captured in a single struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Root directory for application data
    pub data_root: PathBuf,
    /// Directory holding finished downloads
    pub downloads_dir: PathBuf,
    /// Path to the `SQLite` database file
    pub database_path: PathBuf,
}

impl ResolvedPaths {
    /// Resolve all paths, creating the directories they need.
    ///
    /// An explicit `data_dir` (e.g. `--data-dir`) takes precedence over
    /// the environment and platform defaults.
    pub fn resolve(data_dir: Option<&Path>) -> Result<Self, PathError> {
        let data_root = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => data_root()?,
        };
        let database_path = database_path(&data_root)?;
        let downloads_dir = downloads_dir(&data_root)?;

        Ok(Self {
            data_root,
            downloads_dir,
            database_path,
        })
    }
}

impl std::fmt::Display for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "data_root = {}", self.data_root.display())?;
        writeln!(f, "downloads_dir = {}", self.downloads_dir.display())?;
        write!(f, "database_path = {}", self.database_path.display())
    }
}
