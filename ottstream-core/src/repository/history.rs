use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::{models::HistoryEntry, Result};

/// Watch-history repository. One row per (user, video); updates are
/// last-writer-wins upserts that refresh the timestamp.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, user_id: i64, video_id: i64, position_seconds: f64) -> Result<()> {
        sqlx::query(
            "INSERT INTO watch_history (user_id, video_id, position_seconds, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, video_id) DO UPDATE SET
                 position_seconds = excluded.position_seconds,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(video_id)
        .bind(position_seconds)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, user_id: i64, video_id: i64) -> Result<Option<f64>> {
        let row = sqlx::query(
            "SELECT position_seconds FROM watch_history WHERE user_id = ?1 AND video_id = ?2",
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("position_seconds")?)),
            None => Ok(None),
        }
    }

    /// Full history for a user, most recently updated first, joined with
    /// the catalog for display titles.
    pub async fn list(&self, user_id: i64) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            "SELECT w.video_id, w.position_seconds, w.updated_at, v.title
             FROM watch_history w
             JOIN videos v ON v.id = w.video_id
             WHERE w.user_id = ?1
             ORDER BY w.updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(HistoryEntry {
                    video_id: row.try_get("video_id")?,
                    position_seconds: row.try_get("position_seconds")?,
                    updated_at: row.try_get("updated_at")?,
                    title: row.try_get("title")?,
                })
            })
            .collect()
    }

    /// Resume positions keyed by video id, for merging into catalog pages.
    pub async fn resume_positions(&self, user_id: i64) -> Result<HashMap<i64, f64>> {
        let rows =
            sqlx::query("SELECT video_id, position_seconds FROM watch_history WHERE user_id = ?1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let mut positions = HashMap::with_capacity(rows.len());
        for row in &rows {
            positions.insert(row.try_get("video_id")?, row.try_get("position_seconds")?);
        }

        Ok(positions)
    }
}
