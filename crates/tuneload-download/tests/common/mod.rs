//! Shared fixtures for scheduler integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tuneload_download::{
    DownloadError, DownloadEvent, DownloadEventEmitterPort, DownloadId, DownloadRequest,
    TransferHandle, TransferObserver, TransferPort,
};

/// One transfer opened through `FakeTransfer`.
#[derive(Clone)]
pub struct OpenedTransfer {
    pub request: DownloadRequest,
    pub observer: Arc<dyn TransferObserver>,
    pub paused: Arc<AtomicBool>,
}

struct FakeHandle {
    paused: Arc<AtomicBool>,
}

impl TransferHandle for FakeHandle {
    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }
}

/// Scripted transfer: records every open and lets the test drive the observers.
///
/// The internal lock is released before any observer is called so driven
/// callbacks may re-enter the scheduler (and reopen through this fake).
#[derive(Default)]
pub struct FakeTransfer {
    opened: Mutex<Vec<OpenedTransfer>>,
    fail_open: Mutex<HashSet<String>>,
    finish_in_open: Mutex<HashSet<String>>,
}

impl FakeTransfer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make `open` fail for this id.
    pub fn fail_open_for(&self, id: &str) {
        self.fail_open.lock().unwrap().insert(id.to_string());
    }

    /// Make the transfer for this id succeed from inside `open`.
    pub fn finish_in_open_for(&self, id: &str) {
        self.finish_in_open.lock().unwrap().insert(id.to_string());
    }

    /// Ids in the order their transfers were opened.
    pub fn opened_ids(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.request.id.to_string())
            .collect()
    }

    /// How many times a transfer was opened for this id.
    pub fn open_count(&self, id: &str) -> usize {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.request.id.as_str() == id)
            .count()
    }

    /// Most recent transfer opened for this id.
    pub fn latest(&self, id: &str) -> OpenedTransfer {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| t.request.id.as_str() == id)
            .cloned()
            .unwrap_or_else(|| panic!("no transfer opened for {id}"))
    }

    /// Whether the most recent transfer for this id was paused.
    pub fn is_paused(&self, id: &str) -> bool {
        self.latest(id).paused.load(Ordering::SeqCst)
    }

    /// Report progress on the most recent transfer for this id.
    pub fn tick(&self, id: &str, written: u64, expected: Option<u64>) {
        let observer = self.latest(id).observer;
        observer.on_progress(written, expected);
    }

    /// Finish the most recent transfer for this id successfully.
    pub fn succeed(&self, id: &str) {
        let observer = self.latest(id).observer;
        observer.on_finished(Ok(()));
    }

    /// Finish the most recent transfer for this id if one was ever opened.
    pub fn try_succeed(&self, id: &str) -> bool {
        let observer = self
            .opened
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| t.request.id.as_str() == id)
            .map(|t| Arc::clone(&t.observer));
        observer.is_some_and(|observer| {
            observer.on_finished(Ok(()));
            true
        })
    }

    /// Fail the most recent transfer for this id.
    pub fn fail(&self, id: &str, error: DownloadError) {
        let observer = self.latest(id).observer;
        observer.on_finished(Err(error));
    }
}

impl TransferPort for FakeTransfer {
    fn open(
        &self,
        request: &DownloadRequest,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Box<dyn TransferHandle>, DownloadError> {
        if self.fail_open.lock().unwrap().contains(request.id.as_str()) {
            return Err(DownloadError::network("connection refused"));
        }

        let paused = Arc::new(AtomicBool::new(false));
        self.opened.lock().unwrap().push(OpenedTransfer {
            request: request.clone(),
            observer: Arc::clone(&observer),
            paused: Arc::clone(&paused),
        });
        if self.finish_in_open.lock().unwrap().contains(request.id.as_str()) {
            observer.on_finished(Ok(()));
        }
        Ok(Box::new(FakeHandle { paused }))
    }
}

/// Transfer that reports half progress and success from inside `open`.
#[derive(Default)]
pub struct InstantTransfer {
    opened: Mutex<Vec<String>>,
}

impl InstantTransfer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opened_ids(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl TransferPort for InstantTransfer {
    fn open(
        &self,
        request: &DownloadRequest,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Box<dyn TransferHandle>, DownloadError> {
        self.opened.lock().unwrap().push(request.id.to_string());
        observer.on_progress(50, Some(100));
        observer.on_finished(Ok(()));
        Ok(Box::new(FakeHandle {
            paused: Arc::new(AtomicBool::new(false)),
        }))
    }
}

/// Emitter that records every event.
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    events: Arc<Mutex<Vec<DownloadEvent>>>,
}

impl RecordingEmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, id: &str) -> Vec<DownloadEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.id().as_str() == id)
            .collect()
    }
}

impl DownloadEventEmitterPort for RecordingEmitter {
    fn emit(&self, event: DownloadEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}

pub fn request(id: &str) -> DownloadRequest {
    DownloadRequest::new(id, format!("https://example.com/{id}.mp3"), format!("{id}.mp3"))
}

pub fn id(value: &str) -> DownloadId {
    DownloadId::new(value)
}
