//! Local track store port.
//!
//! Answers "do we already have this file, and where is it?" before a caller
//! decides to start a download.

use async_trait::async_trait;
use std::path::PathBuf;

/// Metadata of a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileInfo {
    /// Absolute location of the file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size_bytes: u64,
}

/// Port for the local file existence check.
#[async_trait]
pub trait LocalTrackStore: Send + Sync {
    /// Where a file with this name lives (or would live).
    fn local_path(&self, name: &str) -> PathBuf;

    /// Whether a complete local copy exists.
    async fn exists(&self, name: &str) -> bool;

    /// Path and size of the local copy, if one exists.
    async fn file_info(&self, name: &str) -> Option<LocalFileInfo>;
}
