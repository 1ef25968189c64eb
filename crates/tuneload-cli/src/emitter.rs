//! Event emitter that forwards scheduler events to the fetch loop.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use tuneload_core::{DownloadEvent, DownloadEventEmitterPort};

/// Forwards every event into an unbounded channel.
///
/// Unbounded so `emit` never blocks the scheduler.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: UnboundedSender<DownloadEvent>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiving end of its channel.
    pub fn channel() -> (Self, UnboundedReceiver<DownloadEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DownloadEventEmitterPort for ChannelEmitter {
    fn emit(&self, event: DownloadEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("download event dropped, receiver closed");
        }
    }

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}
