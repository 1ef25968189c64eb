//! `SQLite` implementation of the `DownloadedTrackRepository` trait.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use tuneload_core::{DownloadId, DownloadedTrack, DownloadedTrackRepository, RepositoryError};

/// `SQLite` implementation of the `DownloadedTrackRepository` trait.
pub struct SqliteDownloadedTrackRepository {
    pool: SqlitePool,
}

impl SqliteDownloadedTrackRepository {
    /// Create a new `SQLite` downloaded track repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DownloadedTrackRepository for SqliteDownloadedTrackRepository {
    async fn add(&self, track: &DownloadedTrack) -> Result<(), RepositoryError> {
        let size_bytes = track
            .size_bytes
            .map(i64::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Storage(format!("size_bytes out of range: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO downloads (
                id, name, author, local_path, cover_img, size_bytes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                author = excluded.author,
                local_path = excluded.local_path,
                cover_img = excluded.cover_img,
                size_bytes = excluded.size_bytes,
                created_at = excluded.created_at
            ",
        )
        .bind(track.id.as_str())
        .bind(&track.name)
        .bind(&track.author)
        .bind(track.local_path.to_string_lossy().into_owned())
        .bind(&track.cover_img)
        .bind(size_bytes)
        .bind(format_timestamp(&track.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        tracing::debug!(id = %track.id, "Recorded downloaded track");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DownloadedTrack>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, author, local_path, cover_img, size_bytes, created_at
            FROM downloads
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_track).collect()
    }

    async fn get(&self, id: &DownloadId) -> Result<Option<DownloadedTrack>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, author, local_path, cover_img, size_bytes, created_at
            FROM downloads
            WHERE id = ?
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        row.as_ref().map(row_to_track).transpose()
    }

    async fn remove(&self, id: &DownloadId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM downloads WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Downloaded track with ID '{id}'"
            )));
        }

        Ok(())
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Storage(format!("Invalid created_at '{value}': {e}")))
}

#[allow(clippy::needless_pass_by_value)]
fn map_column_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("Column error: {e}"))
}

/// Convert a database row to a `DownloadedTrack`.
fn row_to_track(row: &sqlx::sqlite::SqliteRow) -> Result<DownloadedTrack, RepositoryError> {
    let id: String = row.try_get("id").map_err(map_column_error)?;
    let name: String = row.try_get("name").map_err(map_column_error)?;
    let author: Option<String> = row.try_get("author").map_err(map_column_error)?;
    let local_path: String = row.try_get("local_path").map_err(map_column_error)?;
    let cover_img: Option<String> = row.try_get("cover_img").map_err(map_column_error)?;
    let size_bytes: Option<i64> = row.try_get("size_bytes").map_err(map_column_error)?;
    let created_at: String = row.try_get("created_at").map_err(map_column_error)?;

    Ok(DownloadedTrack {
        id: DownloadId::new(id),
        name,
        author,
        local_path: PathBuf::from(local_path),
        cover_img,
        size_bytes: size_bytes.and_then(|n| u64::try_from(n).ok()),
        created_at: parse_timestamp(&created_at)?,
    })
}
