// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn range_not_satisfiable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::RANGE_NOT_SATISFIABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Convert `ottstream_core` errors to HTTP errors. Store and I/O failures
/// are logged here and never leak their text to clients.
impl From<ottstream_core::Error> for AppError {
    fn from(err: ottstream_core::Error) -> Self {
        use ottstream_core::Error;

        match err {
            Error::InvalidInput(msg) => Self::bad_request(msg),
            Error::Unauthorized(msg) => Self::unauthorized(msg),
            Error::NotFound(msg) => Self::not_found(msg),
            Error::AlreadyExists(msg) => Self::conflict(msg),
            Error::Database(e) => {
                tracing::error!("Database error: {e}");
                Self::internal("Internal server error")
            }
            Error::Io(e) => {
                tracing::error!("I/O error: {e}");
                Self::internal("Internal server error")
            }
            Error::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        use ottstream_core::Error;

        let err: AppError = Error::Unauthorized("no".to_string()).into();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let err: AppError = Error::AlreadyExists("dup".to_string()).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: AppError = Error::NotFound("gone".to_string()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        // Internal details never reach the client
        let err: AppError = Error::Internal("secret detail".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
