//! Queue DTOs for snapshots.
//!
//! These types are "UI safe" - Clone + Debug + Serialize + Deserialize with no
//! infrastructure dependencies. They're used for transmitting scheduler state
//! to frontends or CLI output.

use serde::{Deserialize, Serialize};

use super::types::DownloadId;

/// Snapshot of the scheduler's active set and pending queue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Maximum number of concurrent transfers.
    pub capacity: u32,
    /// Downloads currently holding a slot, ordered by id.
    pub active: Vec<ActiveDownload>,
    /// Downloads waiting for a slot, in dispatch order.
    pub pending: Vec<DownloadId>,
}

impl QueueSnapshot {
    /// Create a new empty snapshot.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            active: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Check if nothing is active or pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty() && self.pending.is_empty()
    }

    /// Check whether an id currently holds a slot.
    pub fn is_active(&self, id: &DownloadId) -> bool {
        self.active.iter().any(|entry| &entry.id == id)
    }

    /// 1-based position of an id in the pending queue.
    pub fn position(&self, id: &DownloadId) -> Option<usize> {
        self.pending.iter().position(|pending| pending == id).map(|idx| idx + 1)
    }
}

/// One active download in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDownload {
    /// Download id.
    pub id: DownloadId,
    /// Current whole percent.
    pub percent: u8,
}
