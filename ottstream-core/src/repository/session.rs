use sqlx::{Row, SqlitePool};

use crate::{models::Session, Result};

/// Session repository. Tokens are opaque primary keys; expiry is stored as
/// unix seconds so the purge predicate is a single integer comparison.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a session, replacing any previous row with the same token.
    pub async fn create(&self, token: &str, user_id: i64, expires_at: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(token) DO UPDATE SET user_id = excluded.user_id, expires_at = excluded.expires_at",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Session {
                user_id: row.try_get("user_id")?,
                expires_at: row.try_get("expires_at")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove every session whose expiry lies at or before `now`. Returns
    /// the number of rows purged.
    pub async fn purge_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
