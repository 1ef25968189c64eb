#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Re-export core types for convenience
pub use tuneload_core::download::{
    DownloadError, DownloadEvent, DownloadId, DownloadRequest, DownloadStatus, QueueSnapshot,
};
pub use tuneload_core::ports::{
    DownloadEventEmitterPort, DownloadSchedulerConfig, DownloadSchedulerPort, LocalTrackStore,
    NoopDownloadEmitter, ProgressCallback, TransferHandle, TransferObserver, TransferPort,
};

// Internal modules (pub(crate) to keep implementation private)
pub(crate) mod progress;
pub(crate) mod queue;

mod local;
mod scheduler;
mod transfer;

pub use local::FsTrackStore;
pub use scheduler::{DownloadScheduler, DownloadSchedulerDeps, build_download_scheduler};
pub use transfer::{HttpTransfer, PARTIAL_SUFFIX};
