//! Download events - discriminated union for all download state changes.

use serde::{Deserialize, Serialize};

use super::types::DownloadId;

/// Status of a download.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Waiting in the queue.
    Queued,
    /// Currently being downloaded.
    Downloading,
    /// Completed successfully.
    Completed,
    /// Failed with an error.
    Failed,
    /// Cancelled by user.
    Cancelled,
}

impl DownloadStatus {
    /// Whether the download has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Single discriminated union for all download events.
///
/// A UI handles this as a tagged union:
///
/// ```typescript
/// type DownloadEvent =
///   | { type: "download_queued"; id: string; position: number }
///   | { type: "download_started"; id: string }
///   | { type: "download_progress"; id: string; percent: number }
///   | { type: "download_completed"; id: string }
///   | { type: "download_failed"; id: string; error: string }
///   | { type: "download_cancelled"; id: string };
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    /// All slots were busy; the download waits in the queue.
    DownloadQueued {
        /// Download id.
        id: DownloadId,
        /// 1-based position in the pending queue.
        position: u32,
    },

    /// A download took a slot and its transfer is being opened.
    DownloadStarted {
        /// Download id.
        id: DownloadId,
    },

    /// Progress changed.
    DownloadProgress {
        /// Download id.
        id: DownloadId,
        /// Whole percent, 0 to 100.
        percent: u8,
    },

    /// Download completed successfully.
    DownloadCompleted {
        /// Download id.
        id: DownloadId,
    },

    /// Download failed with an error.
    DownloadFailed {
        /// Download id.
        id: DownloadId,
        /// Error message describing what went wrong.
        error: String,
    },

    /// Download was cancelled by the user, active or still queued.
    DownloadCancelled {
        /// Download id.
        id: DownloadId,
    },
}

impl DownloadEvent {
    /// Create a queued event.
    pub fn queued(id: impl Into<DownloadId>, position: u32) -> Self {
        Self::DownloadQueued {
            id: id.into(),
            position,
        }
    }

    /// Create a download started event.
    pub fn started(id: impl Into<DownloadId>) -> Self {
        Self::DownloadStarted { id: id.into() }
    }

    /// Create a progress event.
    pub fn progress(id: impl Into<DownloadId>, percent: u8) -> Self {
        Self::DownloadProgress {
            id: id.into(),
            percent,
        }
    }

    /// Create a completion event.
    pub fn completed(id: impl Into<DownloadId>) -> Self {
        Self::DownloadCompleted { id: id.into() }
    }

    /// Create a failure event.
    pub fn failed(id: impl Into<DownloadId>, error: impl Into<String>) -> Self {
        Self::DownloadFailed {
            id: id.into(),
            error: error.into(),
        }
    }

    /// Create a cancellation event.
    pub fn cancelled(id: impl Into<DownloadId>) -> Self {
        Self::DownloadCancelled { id: id.into() }
    }

    /// The id this event refers to.
    #[must_use]
    pub const fn id(&self) -> &DownloadId {
        match self {
            Self::DownloadQueued { id, .. }
            | Self::DownloadStarted { id }
            | Self::DownloadProgress { id, .. }
            | Self::DownloadCompleted { id }
            | Self::DownloadFailed { id, .. }
            | Self::DownloadCancelled { id } => id,
        }
    }

    /// The status a download is in after this event.
    #[must_use]
    pub const fn status(&self) -> DownloadStatus {
        match self {
            Self::DownloadQueued { .. } => DownloadStatus::Queued,
            Self::DownloadStarted { .. } | Self::DownloadProgress { .. } => {
                DownloadStatus::Downloading
            }
            Self::DownloadCompleted { .. } => DownloadStatus::Completed,
            Self::DownloadFailed { .. } => DownloadStatus::Failed,
            Self::DownloadCancelled { .. } => DownloadStatus::Cancelled,
        }
    }
}
