use sqlx::{Row, SqlitePool};

use crate::{
    models::{User, UserCredentials},
    Result,
};

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the credential material for a username, or `None` when the
    /// account does not exist.
    pub async fn get_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        let row = sqlx::query("SELECT id, password_hash, salt FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserCredentials {
                user_id: row.try_get("id")?,
                password_hash: row.try_get("password_hash")?,
                salt: row.try_get("salt")?,
            })),
            None => Ok(None),
        }
    }

    /// Create a new user. Duplicate usernames surface as
    /// `Error::AlreadyExists` via the unique constraint.
    pub async fn create(&self, username: &str, hash: &[u8], salt: &[u8]) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(username)
        .bind(hash)
        .bind(salt)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id: row.try_get("id")?,
            username: username.to_string(),
        })
    }

    /// Insert-or-replace credential material. Used only by seeding.
    pub async fn upsert(&self, username: &str, hash: &[u8], salt: &[u8]) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (username, password_hash, salt) VALUES (?1, ?2, ?3)
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash, salt = excluded.salt",
        )
        .bind(username)
        .bind(hash)
        .bind(salt)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a username by id.
    pub async fn get_username(&self, user_id: i64) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("username")?)),
            None => Ok(None),
        }
    }

    /// Check if a username is taken.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}
