use sqlx::{Row, SqlitePool};

use crate::{models::Video, Result};

/// Video catalog repository. Rows are keyed by on-disk basename; the
/// catalog engine is the only writer.
#[derive(Clone)]
pub struct VideoRepository {
    pool: SqlitePool,
}

fn row_to_video(row: &sqlx::sqlite::SqliteRow) -> Result<Video> {
    Ok(Video {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        filename: row.try_get("filename")?,
        description: row.try_get("description")?,
        duration_seconds: row.try_get("duration_seconds")?,
    })
}

impl VideoRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a catalog row, unique by filename. Returns the
    /// video id.
    pub async fn upsert(
        &self,
        title: &str,
        filename: &str,
        description: Option<&str>,
        duration_seconds: i64,
    ) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO videos (title, filename, description, duration_seconds) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(filename) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 duration_seconds = excluded.duration_seconds
             RETURNING id",
        )
        .bind(title)
        .bind(filename)
        .bind(description)
        .bind(duration_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("id")?)
    }

    pub async fn delete_by_filename(&self, filename: &str) -> Result<()> {
        sqlx::query("DELETE FROM videos WHERE filename = ?1")
            .bind(filename)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete every video whose filename is not in `live`. History rows
    /// referencing pruned videos cascade away with them.
    ///
    /// The live set is staged into a temp table on a single pinned
    /// connection so the delete is one statement, regardless of set size.
    pub async fn prune_missing(&self, live: &[String]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("CREATE TEMP TABLE IF NOT EXISTS live_filenames (filename TEXT PRIMARY KEY)")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM live_filenames")
            .execute(&mut *tx)
            .await?;

        for filename in live {
            if filename.is_empty() {
                continue;
            }
            sqlx::query("INSERT OR IGNORE INTO live_filenames (filename) VALUES (?1)")
                .bind(filename)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(
            "DELETE FROM videos WHERE filename NOT IN (SELECT filename FROM live_filenames)",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM live_filenames")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    pub async fn get_by_id(&self, video_id: i64) -> Result<Option<Video>> {
        let row = sqlx::query(
            "SELECT id, title, filename, description, duration_seconds FROM videos WHERE id = ?1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_video(&row)?)),
            None => Ok(None),
        }
    }

    /// Page through the catalog. Fetches `limit + 1` rows so the caller
    /// learns whether more pages exist without a second count query.
    /// `search` is a case-insensitive substring over title, filename and
    /// description.
    pub async fn query(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Video>, bool)> {
        let rows = match search {
            Some(term) => {
                let pattern = format!("%{term}%");
                sqlx::query(
                    "SELECT id, title, filename, description, duration_seconds FROM videos
                     WHERE title LIKE ?1 OR filename LIKE ?1 OR IFNULL(description, '') LIKE ?1
                     ORDER BY id
                     LIMIT ?2 OFFSET ?3",
                )
                .bind(pattern)
                .bind(limit + 1)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, title, filename, description, duration_seconds FROM videos
                     ORDER BY id
                     LIMIT ?1 OFFSET ?2",
                )
                .bind(limit + 1)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let has_more = rows.len() as i64 > limit;
        let mut videos = Vec::with_capacity(rows.len().min(limit as usize));
        for row in rows.iter().take(limit as usize) {
            videos.push(row_to_video(row)?);
        }

        Ok((videos, has_more))
    }
}
