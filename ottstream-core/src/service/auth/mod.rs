pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::generate_session_token;

use chrono::Utc;
use tracing::warn;

use crate::{
    repository::{SessionRepository, UserRepository},
    validation::{validate_password, validate_username},
    Error, Result,
};

/// The authenticated identity bound to a request after cookie validation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub token: String,
}

/// The outcome of a successful login or registration: the identity plus
/// the cookie material the HTTP layer needs.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub max_age_seconds: i64,
}

/// Session and credential management on top of the user/session stores.
pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    session_ttl_seconds: i64,
}

impl AuthService {
    #[must_use]
    pub const fn new(
        users: UserRepository,
        sessions: SessionRepository,
        session_ttl_seconds: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            session_ttl_seconds,
        }
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Verify credentials and issue a fresh session. Unknown usernames and
    /// bad passwords are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionGrant> {
        let credentials = self
            .users
            .get_credentials(username)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

        let valid =
            verify_password(password, &credentials.salt, &credentials.password_hash).await?;
        if !valid {
            return Err(Error::Unauthorized("Invalid credentials".to_string()));
        }

        self.issue_session(credentials.user_id, username).await
    }

    /// Validate registration input, create the account, and issue a session
    /// exactly as login does. Duplicates surface as `Error::AlreadyExists`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<SessionGrant> {
        validate_username(username).map_err(|e| Error::InvalidInput(e.to_string()))?;
        validate_password(password).map_err(|e| Error::InvalidInput(e.to_string()))?;
        if password != confirm_password {
            return Err(Error::InvalidInput("Passwords do not match".to_string()));
        }
        if self.users.username_exists(username).await? {
            return Err(Error::AlreadyExists("Username already taken".to_string()));
        }

        let (hash, salt) = hash_password(password).await?;
        let user = self.users.create(username, &hash, &salt).await?;

        self.issue_session(user.id, username).await
    }

    /// Delete the session named by a cookie token. Unknown tokens are a
    /// no-op.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.delete(token).await
    }

    /// Resolve a cookie token into an identity. Expired sessions are
    /// opportunistically deleted and treated as absent.
    pub async fn authenticate(&self, token: &str) -> Result<Option<AuthenticatedUser>> {
        let Some(session) = self.sessions.get(token).await? else {
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        if session.is_expired_at(now) {
            self.sessions.delete(token).await?;
            return Ok(None);
        }

        let Some(username) = self.users.get_username(session.user_id).await? else {
            return Ok(None);
        };

        Ok(Some(AuthenticatedUser {
            user_id: session.user_id,
            username,
            token: token.to_string(),
        }))
    }

    /// Purge sessions past their expiry. Runs at startup and as a side
    /// effect of each session issue.
    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.sessions.purge_expired(Utc::now().timestamp()).await
    }

    async fn issue_session(&self, user_id: i64, username: &str) -> Result<SessionGrant> {
        if let Err(e) = self.purge_expired_sessions().await {
            warn!("Failed to purge expired sessions: {e}");
        }

        let token = generate_session_token();
        let expires_at = Utc::now().timestamp() + self.session_ttl_seconds;
        self.sessions.create(&token, user_id, expires_at).await?;

        Ok(SessionGrant {
            user_id,
            username: username.to_string(),
            token,
            max_age_seconds: self.session_ttl_seconds,
        })
    }
}
