#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod download;
pub mod paths;
pub mod ports;

// Re-export commonly used types for convenience
pub use download::{
    ActiveDownload, DownloadError, DownloadEvent, DownloadId, DownloadRequest, DownloadStatus,
    QueueSnapshot, percent_of,
};
pub use paths::{DATA_DIR_ENV, PathError, ResolvedPaths, data_root, database_path, downloads_dir};
pub use ports::{
    DEFAULT_MAX_CONCURRENT, DownloadEventEmitterPort, DownloadSchedulerConfig,
    DownloadSchedulerPort, DownloadedTrack, DownloadedTrackRepository, LocalFileInfo,
    LocalTrackStore, NoopDownloadEmitter, ProgressCallback, RepositoryError, TransferHandle,
    TransferObserver, TransferPort,
};

#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;
