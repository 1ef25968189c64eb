//! Download scheduler implementation.
//!
//! `DownloadScheduler` owns the active set, the pending queue and the
//! progress table, enforces the concurrency bound and routes transfer
//! outcomes back into admission.
//!
//! # Concurrency Model
//!
//! - One `std::sync::Mutex` guards all state; every critical section is short
//!   and never awaits
//! - The lock is never held while opening or pausing a transfer, invoking a
//!   progress callback or emitting an event
//! - Every admission mints a lease; observer calls carrying a superseded
//!   lease are dropped, so late ticks after a cancel cannot revive progress
//! - A slot is reserved before `open` runs (handle `None`) and the handle is
//!   attached afterwards only if the lease is still current
//! - Launches go through a queue drained by the outermost caller, so
//!   transfers that end inside `open` never nest admissions on the stack

mod observer;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tuneload_core::download::{
    ActiveDownload, COMPLETE_PERCENT, DownloadError, DownloadEvent, DownloadId, DownloadRequest,
    QueueSnapshot, percent_of,
};
use tuneload_core::ports::{
    DownloadEventEmitterPort, DownloadSchedulerConfig, DownloadSchedulerPort, ProgressCallback,
    TransferHandle, TransferPort,
};

use crate::progress::ProgressTable;
use crate::queue::{PendingQueue, QueuedItem};

use observer::LeaseObserver;

const LOG_TARGET: &str = "tuneload.download";

/// Lease ID for tracking one admission of a download.
///
/// Used to drop stale observer calls when a download is cancelled or
/// restarted while its old transfer is still winding down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LeaseId(u64);

/// State for a download holding a slot.
struct ActiveEntry {
    /// Unique lease for this admission.
    lease: LeaseId,
    /// Transfer control, `None` while `open` is still running.
    handle: Option<Box<dyn TransferHandle>>,
    /// Caller callback.
    on_progress: Option<ProgressCallback>,
}

/// Everything guarded by the scheduler lock.
#[derive(Default)]
struct SchedulerState {
    active: HashMap<DownloadId, ActiveEntry>,
    pending: PendingQueue,
    progress: ProgressTable,
    next_lease: u64,
    /// Reserved slots waiting for their transfer to be opened.
    launches: VecDeque<Launch>,
    /// Set while some caller is draining `launches`.
    launching: bool,
}

impl SchedulerState {
    const fn mint_lease(&mut self) -> LeaseId {
        self.next_lease += 1;
        LeaseId(self.next_lease)
    }

    fn is_current(&self, id: &DownloadId, lease: LeaseId) -> bool {
        self.active.get(id).is_some_and(|entry| entry.lease == lease)
    }

    /// Verify the lease matches and remove the entry from the active set.
    fn take_leased(&mut self, id: &DownloadId, lease: LeaseId) -> Option<ActiveEntry> {
        self.is_current(id, lease)
            .then(|| self.active.remove(id))
            .flatten()
    }
}

/// A reserved slot whose transfer still has to be opened.
struct Launch {
    request: DownloadRequest,
    lease: LeaseId,
}

enum Admission {
    Duplicate,
    Launch(Launch),
    Queued(u32),
}

enum Cancellation {
    Unknown,
    Queued,
    Active {
        handle: Option<Box<dyn TransferHandle>>,
        next: Option<Launch>,
    },
}

/// Dependencies for creating a download scheduler.
pub struct DownloadSchedulerDeps<T, E>
where
    T: TransferPort + 'static,
    E: DownloadEventEmitterPort + 'static,
{
    /// Port that performs the byte transfers.
    pub transfer: Arc<T>,
    /// Port for emitting download events.
    pub event_emitter: Arc<E>,
    /// Configuration for the scheduler.
    pub config: DownloadSchedulerConfig,
}

/// Build a download scheduler from its dependencies.
///
/// Fails with `DownloadError::InvalidConfig` when `max_concurrent` is 0.
pub fn build_download_scheduler<T, E>(
    deps: DownloadSchedulerDeps<T, E>,
) -> Result<Arc<DownloadScheduler>, DownloadError>
where
    T: TransferPort + 'static,
    E: DownloadEventEmitterPort + 'static,
{
    DownloadScheduler::new(deps.transfer, deps.event_emitter, &deps.config)
}

/// Bounded-concurrency download scheduler.
///
/// Adapters should typically hold it as `Arc<dyn DownloadSchedulerPort>`.
pub struct DownloadScheduler {
    state: Mutex<SchedulerState>,
    transfer: Arc<dyn TransferPort>,
    event_emitter: Arc<dyn DownloadEventEmitterPort>,
    max_concurrent: u32,
    capacity: usize,
    this: Weak<Self>,
}

impl DownloadScheduler {
    fn new(
        transfer: Arc<dyn TransferPort>,
        event_emitter: Arc<dyn DownloadEventEmitterPort>,
        config: &DownloadSchedulerConfig,
    ) -> Result<Arc<Self>, DownloadError> {
        if config.max_concurrent == 0 {
            return Err(DownloadError::invalid_config(
                "max_concurrent must be at least 1",
            ));
        }
        let capacity = usize::try_from(config.max_concurrent).unwrap_or(usize::MAX);

        Ok(Arc::new_cyclic(|this| Self {
            state: Mutex::new(SchedulerState::default()),
            transfer,
            event_emitter,
            max_concurrent: config.max_concurrent,
            capacity,
            this: this.clone(),
        }))
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Start a download, or queue it if every slot is busy.
    ///
    /// An id that is already active or queued is left untouched.
    pub fn start_download(&self, request: DownloadRequest, on_progress: Option<ProgressCallback>) {
        let id = request.id.clone();

        let admission = {
            let mut state = self.lock_state();
            if state.active.contains_key(&id) || state.pending.is_queued(&id) {
                Admission::Duplicate
            } else {
                state.progress.begin(&id);
                if state.active.len() < self.capacity {
                    Admission::Launch(Self::reserve(&mut state, request, on_progress))
                } else {
                    let item = QueuedItem::new(request, on_progress);
                    Admission::Queued(state.pending.push_back(item))
                }
            }
        };

        match admission {
            Admission::Duplicate => {
                tracing::debug!(target: LOG_TARGET, id = %id, "Ignoring duplicate start");
            }
            Admission::Queued(position) => {
                tracing::debug!(target: LOG_TARGET, id = %id, position, "All slots busy, queued");
                self.event_emitter.emit(DownloadEvent::queued(id, position));
            }
            Admission::Launch(launch) => self.launch(launch),
        }
    }

    /// Cancel an active or queued download. Unknown ids are ignored.
    pub fn cancel_download(&self, id: &DownloadId) {
        let cancellation = {
            let mut state = self.lock_state();
            if let Some(entry) = state.active.remove(id) {
                state.progress.remove(id);
                let next = self.admit_next(&mut state);
                Cancellation::Active {
                    handle: entry.handle,
                    next,
                }
            } else if state.pending.remove(id).is_some() {
                state.progress.remove(id);
                Cancellation::Queued
            } else {
                Cancellation::Unknown
            }
        };

        match cancellation {
            Cancellation::Unknown => {
                tracing::debug!(target: LOG_TARGET, id = %id, "Cancel of unknown download ignored");
            }
            Cancellation::Queued => {
                tracing::info!(target: LOG_TARGET, id = %id, "Cancelled queued download");
                self.event_emitter.emit(DownloadEvent::cancelled(id.clone()));
            }
            Cancellation::Active { handle, next } => {
                if let Some(handle) = handle {
                    handle.pause();
                }
                tracing::info!(target: LOG_TARGET, id = %id, "Cancelled active download");
                self.event_emitter.emit(DownloadEvent::cancelled(id.clone()));
                if let Some(launch) = next {
                    self.launch(launch);
                }
            }
        }
    }

    /// Cancel every active download and drop the pending queue.
    ///
    /// Nothing is admitted afterwards.
    pub fn cancel_all_downloads(&self) {
        let (handles, ids) = {
            let mut state = self.lock_state();
            let mut active: Vec<(DownloadId, ActiveEntry)> = state.active.drain().collect();
            active.sort_by(|a, b| a.0.cmp(&b.0));
            let pending = state.pending.clear();
            state.progress.clear();

            let mut handles = Vec::with_capacity(active.len());
            let mut ids = Vec::with_capacity(active.len() + pending.len());
            for (id, entry) in active {
                handles.push(entry.handle);
                ids.push(id);
            }
            ids.extend(pending.into_iter().map(|item| item.request.id));
            (handles, ids)
        };

        for handle in handles.into_iter().flatten() {
            handle.pause();
        }

        tracing::info!(target: LOG_TARGET, count = ids.len(), "Cancelled all downloads");
        for id in ids {
            self.event_emitter.emit(DownloadEvent::cancelled(id));
        }
    }

    /// Cancel everything, then make sure the pending queue is empty.
    ///
    /// Safe to call repeatedly.
    pub fn clear_downloads(&self) {
        self.cancel_all_downloads();

        let leftovers = {
            let mut state = self.lock_state();
            let items = state.pending.clear();
            for item in &items {
                state.progress.remove(item.id());
            }
            items
        };

        for item in leftovers {
            self.event_emitter
                .emit(DownloadEvent::cancelled(item.request.id));
        }
    }

    // ── Read path ──────────────────────────────────────────────────────────

    /// Current percent for an id, if it is tracked.
    pub fn progress(&self, id: &DownloadId) -> Option<u8> {
        self.lock_state().progress.get(id)
    }

    /// Whether an id currently holds a slot.
    pub fn is_active(&self, id: &DownloadId) -> bool {
        self.lock_state().active.contains_key(id)
    }

    /// Whether an id is waiting in the pending queue.
    pub fn is_queued(&self, id: &DownloadId) -> bool {
        self.lock_state().pending.is_queued(id)
    }

    /// Number of downloads holding a slot.
    pub fn active_count(&self) -> usize {
        self.lock_state().active.len()
    }

    /// Number of downloads waiting for a slot.
    pub fn pending_count(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Maximum number of concurrent transfers.
    pub const fn capacity(&self) -> u32 {
        self.max_concurrent
    }

    /// Snapshot of active (ordered by id) and pending (in dispatch order) downloads.
    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.lock_state();
        let mut active: Vec<ActiveDownload> = state
            .active
            .keys()
            .map(|id| ActiveDownload {
                id: id.clone(),
                percent: state.progress.get(id).unwrap_or(0),
            })
            .collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));

        QueueSnapshot {
            capacity: self.max_concurrent,
            active,
            pending: state.pending.ids(),
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn lock_state(&self) -> MutexGuard<'_, SchedulerState> {
        // Every critical section leaves the state consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a lease and occupy a slot for `request`.
    fn reserve(
        state: &mut SchedulerState,
        request: DownloadRequest,
        on_progress: Option<ProgressCallback>,
    ) -> Launch {
        let lease = state.mint_lease();
        state.active.insert(
            request.id.clone(),
            ActiveEntry {
                lease,
                handle: None,
                on_progress,
            },
        );
        Launch { request, lease }
    }

    /// Admit the oldest pending request if a slot is free.
    ///
    /// Called once per freed slot. The returned launch must be performed
    /// after the lock is released.
    fn admit_next(&self, state: &mut SchedulerState) -> Option<Launch> {
        if state.active.len() >= self.capacity {
            return None;
        }
        let item = state.pending.pop_front()?;
        if state.progress.get(item.id()).is_none() {
            state.progress.begin(item.id());
        }

        tracing::debug!(
            target: LOG_TARGET,
            id = %item.id(),
            waited_ms = item.queued_at.elapsed().as_millis(),
            "Admitting queued download"
        );
        Some(Self::reserve(state, item.request, item.on_progress))
    }

    /// Open the transfer for a reserved slot, then every launch queued
    /// behind it.
    ///
    /// Transfers that finish inside `open` admit the next request through
    /// here again; nested calls only enqueue and the outermost caller drains.
    fn launch(&self, launch: Launch) {
        {
            let mut state = self.lock_state();
            state.launches.push_back(launch);
            if state.launching {
                return;
            }
            state.launching = true;
        }

        loop {
            let next = {
                let mut state = self.lock_state();
                loop {
                    match state.launches.pop_front() {
                        None => {
                            state.launching = false;
                            return;
                        }
                        Some(next) if state.is_current(&next.request.id, next.lease) => break next,
                        Some(next) => {
                            tracing::debug!(target: LOG_TARGET, id = %next.request.id, lease = next.lease.0, "Lease ended before open, dropping launch");
                        }
                    }
                }
            };
            self.open_reserved(next);
        }
    }

    fn open_reserved(&self, launch: Launch) {
        let Launch { request, lease } = launch;
        let id = request.id.clone();

        tracing::info!(
            target: LOG_TARGET,
            id = %id,
            lease = lease.0,
            source = %request.source,
            "Starting download"
        );
        self.event_emitter.emit(DownloadEvent::started(id.clone()));

        let observer = Arc::new(LeaseObserver::new(self.this.clone(), id.clone(), lease));
        match self.transfer.open(&request, observer) {
            Ok(handle) => self.attach(&id, lease, handle),
            Err(error) => {
                tracing::warn!(target: LOG_TARGET, id = %id, error = %error, "Failed to open transfer");
                self.on_transfer_finished(&id, lease, Err(error));
            }
        }
    }

    /// Hand the opened transfer to its entry, or stop it if the lease ended meanwhile.
    fn attach(&self, id: &DownloadId, lease: LeaseId, handle: Box<dyn TransferHandle>) {
        let stale = {
            let mut state = self.lock_state();
            match state.active.get_mut(id) {
                Some(entry) if entry.lease == lease => {
                    entry.handle = Some(handle);
                    None
                }
                _ => Some(handle),
            }
        };

        if let Some(handle) = stale {
            tracing::debug!(target: LOG_TARGET, id = %id, lease = lease.0, "Lease ended while opening, pausing transfer");
            handle.pause();
        }
    }

    fn on_transfer_progress(
        &self,
        id: &DownloadId,
        lease: LeaseId,
        written: u64,
        expected: Option<u64>,
    ) {
        let percent = percent_of(written, expected);

        let (callback, step) = {
            let mut state = self.lock_state();
            let Some(callback) = state
                .active
                .get(id)
                .filter(|entry| entry.lease == lease)
                .map(|entry| entry.on_progress.clone())
            else {
                tracing::trace!(target: LOG_TARGET, id = %id, lease = lease.0, "Ignoring stale progress");
                return;
            };
            let Some(step) = state.progress.advance(id, percent) else {
                return;
            };
            (callback, step)
        };

        if step.changed {
            self.event_emitter
                .emit(DownloadEvent::progress(id.clone(), step.percent));
        }
        if let Some(callback) = callback {
            callback(step.percent);
        }
    }

    fn on_transfer_finished(
        &self,
        id: &DownloadId,
        lease: LeaseId,
        outcome: Result<(), DownloadError>,
    ) {
        let (entry, raised, next) = {
            let mut state = self.lock_state();
            let Some(entry) = state.take_leased(id, lease) else {
                tracing::debug!(target: LOG_TARGET, id = %id, lease = lease.0, "Ignoring stale finish (lease mismatch)");
                return;
            };
            let raised = if outcome.is_ok() {
                state.progress.complete(id)
            } else {
                state.progress.remove(id);
                false
            };
            let next = self.admit_next(&mut state);
            (entry, raised, next)
        };

        match outcome {
            Ok(()) => {
                if raised {
                    self.event_emitter
                        .emit(DownloadEvent::progress(id.clone(), COMPLETE_PERCENT));
                    if let Some(callback) = &entry.on_progress {
                        callback(COMPLETE_PERCENT);
                    }
                }
                tracing::info!(target: LOG_TARGET, id = %id, "Download completed");
                self.event_emitter.emit(DownloadEvent::completed(id.clone()));
            }
            Err(error) if error.is_cancelled() => {
                tracing::info!(target: LOG_TARGET, id = %id, "Transfer stopped on its own");
                self.event_emitter.emit(DownloadEvent::cancelled(id.clone()));
            }
            Err(error) => {
                tracing::warn!(target: LOG_TARGET, id = %id, error = %error, "Download failed");
                self.event_emitter
                    .emit(DownloadEvent::failed(id.clone(), error.user_message()));
            }
        }

        if let Some(launch) = next {
            self.launch(launch);
        }
    }
}

impl DownloadSchedulerPort for DownloadScheduler {
    fn start_download(&self, request: DownloadRequest, on_progress: Option<ProgressCallback>) {
        Self::start_download(self, request, on_progress);
    }

    fn cancel_download(&self, id: &DownloadId) {
        Self::cancel_download(self, id);
    }

    fn cancel_all_downloads(&self) {
        Self::cancel_all_downloads(self);
    }

    fn clear_downloads(&self) {
        Self::clear_downloads(self);
    }

    fn progress(&self, id: &DownloadId) -> Option<u8> {
        Self::progress(self, id)
    }

    fn snapshot(&self) -> QueueSnapshot {
        Self::snapshot(self)
    }
}
