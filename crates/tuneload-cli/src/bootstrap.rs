//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Paths (via tuneload-core)
//! - Database pool and repository (via tuneload-db)
//! - Local track store, HTTP transfer and scheduler (via tuneload-download)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use tuneload_core::{
    DownloadEventEmitterPort, DownloadSchedulerConfig, DownloadedTrackRepository,
    LocalTrackStore, ResolvedPaths,
};
use tuneload_db::{SqliteDownloadedTrackRepository, setup_database};
use tuneload_download::{
    DownloadScheduler, DownloadSchedulerDeps, FsTrackStore, HttpTransfer,
    build_download_scheduler,
};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit data directory, overriding env and platform defaults.
    pub data_dir: Option<PathBuf>,
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Resolved data, downloads and database locations.
    pub paths: ResolvedPaths,
    /// Record of downloaded tracks.
    pub tracks: Arc<dyn DownloadedTrackRepository>,
    /// Local copies in the downloads directory.
    pub store: Arc<dyn LocalTrackStore>,
}

impl CliContext {
    /// Build a scheduler that downloads over HTTP into the downloads directory.
    ///
    /// Must be called from within a tokio runtime.
    pub fn download_scheduler<E>(
        &self,
        max_concurrent: u32,
        event_emitter: Arc<E>,
    ) -> Result<Arc<DownloadScheduler>, CliError>
    where
        E: DownloadEventEmitterPort + 'static,
    {
        let transfer = Arc::new(HttpTransfer::new(&self.paths.downloads_dir)?);
        let scheduler = build_download_scheduler(DownloadSchedulerDeps {
            transfer,
            event_emitter,
            config: DownloadSchedulerConfig::new().with_max_concurrent(max_concurrent),
        })?;
        Ok(scheduler)
    }
}

/// Bootstrap the CLI with all dependencies wired up.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let paths = ResolvedPaths::resolve(config.data_dir.as_deref())
        .context("Failed to resolve data directories")?;
    tracing::debug!(data_root = %paths.data_root.display(), "paths resolved");

    let pool = setup_database(&paths.database_path).await?;
    let tracks: Arc<dyn DownloadedTrackRepository> =
        Arc::new(SqliteDownloadedTrackRepository::new(pool));
    let store: Arc<dyn LocalTrackStore> = Arc::new(FsTrackStore::new(&paths.downloads_dir));

    Ok(CliContext {
        paths,
        tracks,
        store,
    })
}
