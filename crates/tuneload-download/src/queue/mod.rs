//! Pending download queue.
//!
//! # Design
//!
//! - Pure synchronous FIFO (no async, no IO, no tracing)
//! - No internal locking; the scheduler owns synchronization
//! - An id appears at most once; the caller checks `is_queued` first
//!
//! Positions are 1-based: the head of the queue is position 1.

// Queue positions are always well under u32::MAX in practice
#![allow(clippy::cast_possible_truncation)]

mod types;

use std::collections::VecDeque;

use tuneload_core::download::DownloadId;

pub use types::QueuedItem;

/// FIFO of requests waiting for a concurrency slot.
#[derive(Debug, Default)]
pub struct PendingQueue {
    items: VecDeque<QueuedItem>,
}

impl PendingQueue {
    /// Number of waiting items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if a download ID is currently queued.
    pub fn is_queued(&self, id: &DownloadId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Append an item to the back of the queue.
    ///
    /// Returns its 1-based position.
    pub fn push_back(&mut self, item: QueuedItem) -> u32 {
        self.items.push_back(item);
        self.items.len() as u32
    }

    /// Take the oldest item.
    pub fn pop_front(&mut self) -> Option<QueuedItem> {
        self.items.pop_front()
    }

    /// Remove an item by id, keeping the order of the rest.
    pub fn remove(&mut self, id: &DownloadId) -> Option<QueuedItem> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        self.items.remove(idx)
    }

    /// Drop every item, returning them in dispatch order.
    pub fn clear(&mut self) -> Vec<QueuedItem> {
        self.items.drain(..).collect()
    }

    /// Ids in dispatch order.
    pub fn ids(&self) -> Vec<DownloadId> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }
}
