//! Download scheduler port definition.
//!
//! This port defines the public interface of the download subsystem as
//! seen by callers (UI providers, the CLI). It hides leases, handles and
//! locking behind a small synchronous API.
//!
//! # Design
//!
//! - Lifecycle calls never fail and never wait for a transfer
//! - Unknown ids and duplicate starts are no-ops, not errors
//! - Progress is readable at any time through `progress`

use std::sync::Arc;

use crate::download::{DownloadId, DownloadRequest, QueueSnapshot};

/// Default number of concurrent transfers.
pub const DEFAULT_MAX_CONCURRENT: u32 = 3;

/// Per-request progress callback, invoked with a whole percent.
///
/// Values are non-decreasing for one lifecycle and end at 100 on success.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Configuration for creating a download scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSchedulerConfig {
    /// Maximum concurrent transfers. Must be positive.
    pub max_concurrent: u32,
}

impl Default for DownloadSchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl DownloadSchedulerConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum concurrent transfers.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max: u32) -> Self {
        self.max_concurrent = max;
        self
    }
}

/// Port for the download scheduler.
///
/// Implementations must be safe to call from any thread, including from
/// inside a `ProgressCallback`.
pub trait DownloadSchedulerPort: Send + Sync {
    /// Start a download, or queue it if every slot is busy.
    ///
    /// Starting an id that is already active or queued is ignored.
    fn start_download(&self, request: DownloadRequest, on_progress: Option<ProgressCallback>);

    /// Cancel an active or queued download. Unknown ids are ignored.
    fn cancel_download(&self, id: &DownloadId);

    /// Cancel every active download and drop the pending queue.
    fn cancel_all_downloads(&self);

    /// Cancel everything and make sure the pending queue is empty.
    fn clear_downloads(&self);

    /// Current percent for an id, if it is tracked.
    fn progress(&self, id: &DownloadId) -> Option<u8>;

    /// Snapshot of active and pending downloads.
    fn snapshot(&self) -> QueueSnapshot;
}
