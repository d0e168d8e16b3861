//! Input validation for the registration surface.
//!
//! Canonical limits live here so the HTTP layer and tests agree on a single
//! source of truth.

/// Minimum username length
pub const USERNAME_MIN: usize = 3;
/// Maximum username length
pub const USERNAME_MAX: usize = 32;

/// Minimum password length
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length
pub const PASSWORD_MAX: usize = 128;

/// Validation error carrying a user-visible message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Validate a username against the registration rules: 3-32 characters,
/// ASCII letters, digits and underscore only.
pub fn validate_username(username: &str) -> ValidationResult {
    if username.len() < USERNAME_MIN {
        return Err(ValidationError::new(
            "username",
            format!("must be at least {USERNAME_MIN} characters"),
        ));
    }
    if username.len() > USERNAME_MAX {
        return Err(ValidationError::new(
            "username",
            format!("must be at most {USERNAME_MAX} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new(
            "username",
            "can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}

/// Validate a password: 8-128 characters.
pub fn validate_password(password: &str) -> ValidationResult {
    if password.len() < PASSWORD_MIN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if password.len() > PASSWORD_MAX {
        return Err(ValidationError::new(
            "password",
            format!("must be at most {PASSWORD_MAX} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("user_42").is_ok());
        assert!(validate_username("abc").is_ok());
    }

    #[test]
    fn rejects_short_and_long_usernames() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn rejects_special_characters() {
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username("dash-ed").is_err());
        assert!(validate_username("dotted.name").is_err());
        assert!(validate_username("émile").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password(&"p".repeat(128)).is_ok());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }
}
