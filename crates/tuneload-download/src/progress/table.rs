//! Progress table: id to whole percent.
//!
//! Values only move up while a download is active. Success pins the value
//! at 100 and the entry stays until the id starts over or everything is
//! cleared. Cancellation and failure remove the entry.

use std::collections::HashMap;

use tuneload_core::download::{COMPLETE_PERCENT, DownloadId};

/// Result of applying a tick to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    /// Stored percent after the tick.
    pub percent: u8,
    /// Whether the stored percent moved.
    pub changed: bool,
}

/// Progress for every tracked download.
#[derive(Debug, Default)]
pub struct ProgressTable {
    entries: HashMap<DownloadId, u8>,
}

impl ProgressTable {
    /// Start (or restart) tracking an id at 0.
    pub fn begin(&mut self, id: &DownloadId) {
        self.entries.insert(id.clone(), 0);
    }

    /// Raise the stored value to `percent` if it is higher.
    ///
    /// Returns `None` when the id is not tracked.
    pub fn advance(&mut self, id: &DownloadId, percent: u8) -> Option<ProgressStep> {
        let stored = self.entries.get_mut(id)?;
        let next = percent.min(COMPLETE_PERCENT).max(*stored);
        let changed = next != *stored;
        *stored = next;
        Some(ProgressStep {
            percent: next,
            changed,
        })
    }

    /// Pin an id at 100, tracking it if needed.
    ///
    /// Returns `true` when the stored value was below 100.
    pub fn complete(&mut self, id: &DownloadId) -> bool {
        let previous = self.entries.insert(id.clone(), COMPLETE_PERCENT);
        previous != Some(COMPLETE_PERCENT)
    }

    /// Stop tracking an id.
    pub fn remove(&mut self, id: &DownloadId) -> Option<u8> {
        self.entries.remove(id)
    }

    /// Current percent for an id.
    pub fn get(&self, id: &DownloadId) -> Option<u8> {
        self.entries.get(id).copied()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of tracked ids.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
