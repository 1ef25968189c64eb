//! Mocks and fixtures shared by handler tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;

use tuneload_core::{
    DownloadId, DownloadedTrack, DownloadedTrackRepository, RepositoryError, ResolvedPaths,
};
use tuneload_download::FsTrackStore;

use crate::bootstrap::CliContext;

mock! {
    pub Tracks {}

    #[async_trait]
    impl DownloadedTrackRepository for Tracks {
        async fn add(&self, track: &DownloadedTrack) -> Result<(), RepositoryError>;
        async fn list(&self) -> Result<Vec<DownloadedTrack>, RepositoryError>;
        async fn get(&self, id: &DownloadId) -> Result<Option<DownloadedTrack>, RepositoryError>;
        async fn remove(&self, id: &DownloadId) -> Result<(), RepositoryError>;
    }
}

/// Context rooted at `data_dir` with a mocked repository and a real store.
pub fn context(data_dir: &Path, tracks: MockTracks) -> CliContext {
    let paths = ResolvedPaths::resolve(Some(data_dir)).unwrap();
    let store = Arc::new(FsTrackStore::new(&paths.downloads_dir));
    CliContext {
        paths,
        tracks: Arc::new(tracks),
        store,
    }
}
