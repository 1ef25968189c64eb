//! Download event emitter port.
//!
//! This port abstracts download event emission, allowing the scheduler to
//! emit events without coupling to transport details (channels, UI bridges).

use crate::download::DownloadEvent;

/// Port for emitting download events.
///
/// Implementations handle the actual event delivery (channels, logs, UI).
/// The scheduler calls `emit` with no internal lock held.
pub trait DownloadEventEmitterPort: Send + Sync {
    /// Emit a download event.
    ///
    /// This method should not block.
    fn emit(&self, event: DownloadEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort>;
}

/// A no-op download event emitter for tests and callers that only poll.
#[derive(Debug, Clone, Default)]
pub struct NoopDownloadEmitter;

impl NoopDownloadEmitter {
    /// Create a new no-op download emitter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DownloadEventEmitterPort for NoopDownloadEmitter {
    fn emit(&self, _event: DownloadEvent) {}

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}
