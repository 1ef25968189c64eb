//! Transfer observer bound to one admission.

use std::sync::Weak;

use tuneload_core::download::{DownloadError, DownloadId};
use tuneload_core::ports::TransferObserver;

use super::{DownloadScheduler, LeaseId};

/// Routes transfer callbacks back to the scheduler, tagged with the lease
/// they were opened under.
///
/// Holds a weak reference so an abandoned transfer cannot keep the
/// scheduler alive.
pub(super) struct LeaseObserver {
    scheduler: Weak<DownloadScheduler>,
    id: DownloadId,
    lease: LeaseId,
}

impl LeaseObserver {
    pub(super) const fn new(
        scheduler: Weak<DownloadScheduler>,
        id: DownloadId,
        lease: LeaseId,
    ) -> Self {
        Self {
            scheduler,
            id,
            lease,
        }
    }
}

impl TransferObserver for LeaseObserver {
    fn on_progress(&self, written: u64, expected: Option<u64>) {
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.on_transfer_progress(&self.id, self.lease, written, expected);
        }
    }

    fn on_finished(&self, outcome: Result<(), DownloadError>) {
        match self.scheduler.upgrade() {
            Some(scheduler) => scheduler.on_transfer_finished(&self.id, self.lease, outcome),
            None => {
                tracing::debug!(id = %self.id, "Scheduler dropped before transfer finished");
            }
        }
    }
}
