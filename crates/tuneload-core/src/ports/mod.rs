//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the download core expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or tokio types in any signature
//! - Transfer and scheduler ports are synchronous; they must never block on I/O
//! - Repository and store ports are async and intent-based

pub mod download_event_emitter;
pub mod download_scheduler;
pub mod downloaded_tracks;
pub mod local_store;
pub mod transfer;

use thiserror::Error;

pub use download_event_emitter::{DownloadEventEmitterPort, NoopDownloadEmitter};
pub use download_scheduler::{
    DEFAULT_MAX_CONCURRENT, DownloadSchedulerConfig, DownloadSchedulerPort, ProgressCallback,
};
pub use downloaded_tracks::{DownloadedTrack, DownloadedTrackRepository};
pub use local_store::{LocalFileInfo, LocalTrackStore};
pub use transfer::{TransferHandle, TransferObserver, TransferPort};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for callers to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),
}
