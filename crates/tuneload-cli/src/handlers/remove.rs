//! Handler for `tuneload remove`.

use std::io::ErrorKind;

use anyhow::{Context, Result};

use tuneload_core::DownloadId;

use crate::bootstrap::CliContext;

/// Drop the record for `id` and, unless `keep_file`, delete its local file.
///
/// Returns whether a record existed.
pub async fn execute(ctx: &CliContext, id: &str, keep_file: bool) -> Result<bool> {
    let id = DownloadId::new(id);
    let Some(track) = ctx.tracks.get(&id).await? else {
        println!("No downloaded track with id '{id}'.");
        return Ok(false);
    };

    ctx.tracks.remove(&id).await?;

    if keep_file {
        println!("Removed '{}' (file kept at {})", track.name, track.local_path.display());
        return Ok(true);
    }

    match tokio::fs::remove_file(&track.local_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %track.local_path.display(), "file already gone");
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to delete {}", track.local_path.display())
            });
        }
    }

    println!("Removed '{}'", track.name);
    Ok(true)
}
