//! Filesystem-backed local track store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use tuneload_core::ports::{LocalFileInfo, LocalTrackStore};

/// Resolves track files under one base directory.
#[derive(Debug, Clone)]
pub struct FsTrackStore {
    base_dir: PathBuf,
}

impl FsTrackStore {
    /// Create a store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory tracks are looked up in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[async_trait]
impl LocalTrackStore for FsTrackStore {
    fn local_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    async fn exists(&self, name: &str) -> bool {
        self.file_info(name).await.is_some()
    }

    async fn file_info(&self, name: &str) -> Option<LocalFileInfo> {
        let path = self.local_path(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(LocalFileInfo {
                path,
                size_bytes: meta.len(),
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "No local copy");
                None
            }
        }
    }
}
