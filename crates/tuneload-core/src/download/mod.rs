//! Download domain types, events, errors and snapshots.
//!
//! This module contains pure data types for the download system. No I/O,
//! networking, or runtime dependencies allowed.
//!
//! # Structure
//!
//! - `types` - Identifiers and requests (`DownloadId`, `DownloadRequest`)
//! - `events` - Download events and status types (`DownloadEvent`, `DownloadStatus`)
//! - `errors` - Error types for download operations
//! - `queue` - Snapshot DTOs (`QueueSnapshot`, `ActiveDownload`)
//! - `progress` - Byte counts to percent conversion

pub mod errors;
pub mod events;
pub mod progress;
pub mod queue;
pub mod types;

// Re-export commonly used types
pub use errors::DownloadError;
pub use events::{DownloadEvent, DownloadStatus};
pub use progress::{COMPLETE_PERCENT, percent_of};
pub use queue::{ActiveDownload, QueueSnapshot};
pub use types::{DownloadId, DownloadRequest};
