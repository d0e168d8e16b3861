use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tokio::task;

use crate::{Error, Result};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Derived hash length in bytes.
pub const HASH_LEN: usize = 32;
/// PBKDF2 iteration count. Changing this invalidates stored credentials.
const ITERATIONS: u32 = 200_000;

fn derive(password: &[u8], salt: &[u8]) -> [u8; HASH_LEN] {
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, ITERATIONS, &mut hash);
    hash
}

/// Hash a password with a fresh random salt using PBKDF2-HMAC-SHA256.
///
/// Returns `(hash, salt)`. This is a CPU-intensive operation and runs on a
/// blocking thread.
pub async fn hash_password(password: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let password = password.to_string();

    task::spawn_blocking(move || {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let hash = derive(password.as_bytes(), &salt);
        Ok((hash.to_vec(), salt.to_vec()))
    })
    .await
    .map_err(|e| Error::Internal(format!("Password hashing task failed: {e}")))?
}

/// Verify a password against stored credential material in constant time.
///
/// This is a CPU-intensive operation and runs on a blocking thread.
pub async fn verify_password(password: &str, salt: &[u8], expected_hash: &[u8]) -> Result<bool> {
    let password = password.to_string();
    let salt = salt.to_vec();
    let expected_hash = expected_hash.to_vec();

    task::spawn_blocking(move || {
        if expected_hash.len() != HASH_LEN || salt.is_empty() {
            return Ok(false);
        }
        let computed = derive(password.as_bytes(), &salt);
        Ok(computed.ct_eq(expected_hash.as_slice()).into())
    })
    .await
    .map_err(|e| Error::Internal(format!("Password verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_password_lengths() {
        let (hash, salt) = hash_password("test_password_123").await.unwrap();
        assert_eq!(hash.len(), HASH_LEN);
        assert_eq!(salt.len(), SALT_LEN);
    }

    #[tokio::test]
    async fn test_verify_password_correct() {
        let password = "test_password_123";
        let (hash, salt) = hash_password(password).await.unwrap();

        let is_valid = verify_password(password, &salt, &hash).await.unwrap();
        assert!(is_valid);
    }

    #[tokio::test]
    async fn test_verify_password_incorrect() {
        let (hash, salt) = hash_password("test_password_123").await.unwrap();

        let is_valid = verify_password("wrong_password", &salt, &hash).await.unwrap();
        assert!(!is_valid);
    }

    #[tokio::test]
    async fn test_salt_uniqueness() {
        let password = "test_password_123";
        let (hash1, salt1) = hash_password(password).await.unwrap();
        let (hash2, salt2) = hash_password(password).await.unwrap();

        // Same password should produce different material (different salts)
        assert_ne!(salt1, salt2);
        assert_ne!(hash1, hash2);

        // But both should verify correctly
        assert!(verify_password(password, &salt1, &hash1).await.unwrap());
        assert!(verify_password(password, &salt2, &hash2).await.unwrap());
    }

    #[tokio::test]
    async fn test_truncated_hash_rejected() {
        let (hash, salt) = hash_password("test_password_123").await.unwrap();
        let is_valid = verify_password("test_password_123", &salt, &hash[..16])
            .await
            .unwrap();
        assert!(!is_valid);
    }
}
