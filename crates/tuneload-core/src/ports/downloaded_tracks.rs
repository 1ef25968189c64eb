//! Downloaded track repository port.
//!
//! Records which tracks have a complete local copy. The scheduler never
//! writes here: the caller records a track once it sees the download
//! complete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::RepositoryError;
use crate::download::DownloadId;

/// A track with a complete local copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedTrack {
    /// Id the track was downloaded under.
    pub id: DownloadId,
    /// Display name.
    pub name: String,
    /// Artist or author, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Where the file lives on disk.
    pub local_path: PathBuf,
    /// Cover image locator, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
    /// File size in bytes, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// When the download was recorded.
    pub created_at: DateTime<Utc>,
}

impl DownloadedTrack {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<DownloadId>, name: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author: None,
            local_path,
            cover_img: None,
            size_bytes: None,
            created_at: Utc::now(),
        }
    }

    /// Set the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the cover image locator.
    #[must_use]
    pub fn with_cover_img(mut self, cover_img: impl Into<String>) -> Self {
        self.cover_img = Some(cover_img.into());
        self
    }

    /// Set the file size.
    #[must_use]
    pub const fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// Port for persisting downloaded tracks.
///
/// Implemented by `tuneload-db`.
#[async_trait]
pub trait DownloadedTrackRepository: Send + Sync {
    /// Record a downloaded track. An existing record with the same id is replaced.
    async fn add(&self, track: &DownloadedTrack) -> Result<(), RepositoryError>;

    /// All recorded tracks, newest first.
    async fn list(&self) -> Result<Vec<DownloadedTrack>, RepositoryError>;

    /// Look up one track.
    async fn get(&self, id: &DownloadId) -> Result<Option<DownloadedTrack>, RepositoryError>;

    /// Delete a record. Fails with `NotFound` if there is none.
    async fn remove(&self, id: &DownloadId) -> Result<(), RepositoryError>;
}
