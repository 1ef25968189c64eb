//! Core domain types for downloads.
//!
//! Pure data types with no I/O dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-assigned identifier for a download.
///
/// One id names one logical resource (a track). The scheduler never holds
/// two transfers for the same id at the same time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(String);

impl DownloadId {
    /// Create a new download ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DownloadId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DownloadId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DownloadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Request to download one remote resource.
///
/// This is a pure value: it is built by the caller, handed to the
/// scheduler, and dropped once the download reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// Identifier of the logical resource.
    pub id: DownloadId,
    /// Remote locator (URI) of the resource.
    pub source: String,
    /// File name the resource is stored under locally.
    pub destination_name: String,
}

impl DownloadRequest {
    /// Create a new download request.
    pub fn new(
        id: impl Into<DownloadId>,
        source: impl Into<String>,
        destination_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            destination_name: destination_name.into(),
        }
    }
}
