use serde::Serialize;

/// A stored account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Credential material for password verification. The hash and salt are
/// opaque byte strings of fixed lengths (32 and 16 bytes respectively).
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: i64,
    pub password_hash: Vec<u8>,
    pub salt: Vec<u8>,
}
