//! HTTP(S) transfer primitive.
//!
//! Streams a response body into `<destination_dir>/<name>.part` on a tokio
//! task, reporting bytes written after every chunk, and renames the file to
//! `<name>` once the body is complete. `pause()` cancels the task; the
//! partial file is removed and the observer sees `Err(Cancelled)`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use url::Url;

use tuneload_core::download::{DownloadError, DownloadRequest};
use tuneload_core::ports::{TransferHandle, TransferObserver, TransferPort};

/// Suffix of files still being written.
pub const PARTIAL_SUFFIX: &str = ".part";

/// `TransferPort` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
    destination_dir: PathBuf,
    runtime: Handle,
}

impl HttpTransfer {
    /// Create a transfer writing into `destination_dir`.
    ///
    /// Must be called from within a tokio runtime; transfers are spawned on it.
    pub fn new(destination_dir: impl Into<PathBuf>) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(concat!("tuneload/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::invalid_config(format!("HTTP client: {e}")))?;
        Self::with_client(client, destination_dir)
    }

    /// Create a transfer with a preconfigured client.
    pub fn with_client(
        client: Client,
        destination_dir: impl Into<PathBuf>,
    ) -> Result<Self, DownloadError> {
        let runtime = Handle::try_current().map_err(|e| {
            DownloadError::invalid_config(format!("HttpTransfer needs a tokio runtime: {e}"))
        })?;

        Ok(Self {
            client,
            destination_dir: destination_dir.into(),
            runtime,
        })
    }

    /// Directory finished files land in.
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }
}

impl TransferPort for HttpTransfer {
    fn open(
        &self,
        request: &DownloadRequest,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Box<dyn TransferHandle>, DownloadError> {
        let url = parse_source(&request.source)?;
        validate_destination_name(&request.destination_name)?;

        let cancel = CancellationToken::new();
        let job = TransferJob {
            client: self.client.clone(),
            url,
            destination: self.destination_dir.join(&request.destination_name),
            observer,
            cancel: cancel.clone(),
        };

        tracing::debug!(id = %request.id, url = %job.url, "Spawning HTTP transfer");
        self.runtime.spawn(job.run());

        Ok(Box::new(HttpTransferHandle { cancel }))
    }
}

struct HttpTransferHandle {
    cancel: CancellationToken,
}

impl TransferHandle for HttpTransferHandle {
    fn pause(&self) {
        self.cancel.cancel();
    }
}

struct TransferJob {
    client: Client,
    url: Url,
    destination: PathBuf,
    observer: Arc<dyn TransferObserver>,
    cancel: CancellationToken,
}

impl TransferJob {
    async fn run(self) {
        let partial = partial_path(&self.destination);

        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(DownloadError::Cancelled),
            result = self.stream_to(&partial) => result,
        };

        if outcome.is_err() {
            if let Err(e) = fs::remove_file(&partial).await {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %partial.display(), error = %e, "Failed to remove partial file");
                }
            }
        }

        self.observer.on_finished(outcome);
    }

    async fn stream_to(&self, partial: &Path) -> Result<(), DownloadError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::network_with_status(
                format!("HTTP {status} for {}", self.url),
                status.as_u16(),
            ));
        }

        let expected = response.content_length();

        if let Some(parent) = partial.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let mut file = fs::File::create(partial).await.map_err(io_error)?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(network_error)?;
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
            self.observer.on_progress(written, expected);
        }

        file.flush().await.map_err(io_error)?;
        drop(file);

        fs::rename(partial, &self.destination)
            .await
            .map_err(io_error)?;

        tracing::debug!(path = %self.destination.display(), bytes = written, "HTTP transfer finished");
        Ok(())
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn parse_source(source: &str) -> Result<Url, DownloadError> {
    let url = Url::parse(source)
        .map_err(|e| DownloadError::invalid_request(format!("invalid source '{source}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DownloadError::invalid_request(format!(
            "unsupported scheme '{other}' in '{source}'"
        ))),
    }
}

fn validate_destination_name(name: &str) -> Result<(), DownloadError> {
    if name.trim().is_empty() {
        return Err(DownloadError::invalid_request("destination name is empty"));
    }
    if name == "." || name == ".." {
        return Err(DownloadError::invalid_request(format!(
            "destination name '{name}' is not a file name"
        )));
    }
    if name.contains(['/', '\\']) {
        return Err(DownloadError::invalid_request(format!(
            "destination name '{name}' must not contain path separators"
        )));
    }
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn network_error(err: reqwest::Error) -> DownloadError {
    match err.status() {
        Some(status) => DownloadError::network_with_status(err.to_string(), status.as_u16()),
        None => DownloadError::network(err.to_string()),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn io_error(err: std::io::Error) -> DownloadError {
    DownloadError::from_io_error(&err)
}
