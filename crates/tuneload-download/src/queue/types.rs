//! Queue item types (internal implementation).

use std::fmt;
use std::time::Instant;

use tuneload_core::download::{DownloadId, DownloadRequest};
use tuneload_core::ports::ProgressCallback;

/// A request waiting for a free slot.
#[derive(Clone)]
pub struct QueuedItem {
    /// The request to launch once admitted.
    pub request: DownloadRequest,
    /// Caller callback, carried over to the active entry on admission.
    pub on_progress: Option<ProgressCallback>,
    /// When this item was queued (for ordering/debugging).
    pub queued_at: Instant,
}

impl QueuedItem {
    /// Create a new queued item stamped with the current time.
    pub fn new(request: DownloadRequest, on_progress: Option<ProgressCallback>) -> Self {
        Self {
            request,
            on_progress,
            queued_at: Instant::now(),
        }
    }

    /// Id of the queued request.
    pub const fn id(&self) -> &DownloadId {
        &self.request.id
    }
}

impl fmt::Debug for QueuedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedItem")
            .field("request", &self.request)
            .field("has_callback", &self.on_progress.is_some())
            .field("queued_at", &self.queued_at)
            .finish()
    }
}
