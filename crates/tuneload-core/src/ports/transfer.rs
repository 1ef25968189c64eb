//! Transfer primitive port.
//!
//! The scheduler never moves bytes itself. It asks a `TransferPort` to open
//! a transfer for a request and receives progress and the terminal outcome
//! through a `TransferObserver` it registers at open time.
//!
//! # Contract
//!
//! - `open` returns quickly; the actual I/O runs elsewhere (a task, a thread)
//! - The observer sees zero or more `on_progress` calls and then at most one
//!   `on_finished` call
//! - Observer calls may arrive on any thread, including synchronously from
//!   inside `open`, and may keep arriving after `pause()`
//! - `pause()` is best-effort and immediate; partial files may be left behind

use std::sync::Arc;

use crate::download::{DownloadError, DownloadRequest};

/// Receiver for the events of one transfer.
pub trait TransferObserver: Send + Sync {
    /// Bytes written so far and, when known, bytes expected in total.
    fn on_progress(&self, written: u64, expected: Option<u64>);

    /// Terminal outcome of the transfer. Called at most once.
    fn on_finished(&self, outcome: Result<(), DownloadError>);
}

/// Control handle for one in-flight transfer.
pub trait TransferHandle: Send + Sync {
    /// Stop the transfer as soon as possible.
    ///
    /// Calling this on a transfer that already finished is harmless.
    fn pause(&self);
}

/// Factory for transfers.
pub trait TransferPort: Send + Sync {
    /// Start transferring `request.source` into `request.destination_name`.
    ///
    /// An `Err` means nothing was started and the observer will not be called.
    fn open(
        &self,
        request: &DownloadRequest,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Box<dyn TransferHandle>, DownloadError>;
}
