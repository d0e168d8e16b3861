// Static-asset fallback for non-/api paths

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::Response,
};
use once_cell::sync::Lazy;

use super::{AppError, AppResult, AppState};

static MIME_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("html", "text/html; charset=utf-8"),
        ("css", "text/css; charset=utf-8"),
        ("js", "application/javascript"),
        ("json", "application/json"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("svg", "image/svg+xml"),
        ("ico", "image/x-icon"),
        ("mp4", "video/mp4"),
    ])
});

fn mime_for_path(path: &str) -> &'static str {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| MIME_TYPES.get(ext.as_str()).copied())
        .unwrap_or("application/octet-stream")
}

/// Fallback handler: unknown `/api` routes are JSON 404s; everything else
/// resolves inside the static directory, with `/` mapping to `index.html`.
pub async fn serve(State(state): State<AppState>, uri: Uri) -> AppResult<Response> {
    let path = uri.path();

    if path == "/api" || path.starts_with("/api/") {
        return Err(AppError::not_found("Not Found"));
    }

    // No path that climbs out of the static root is ever served.
    if path.contains("..") {
        return Err(AppError::forbidden("Forbidden"));
    }

    let relative = if path == "/" {
        "index.html"
    } else {
        path.trim_start_matches('/')
    };
    if relative.is_empty() {
        return Err(AppError::not_found("Not Found"));
    }

    let full_path = state.static_dir.join(relative);
    let metadata = tokio::fs::metadata(&full_path)
        .await
        .map_err(|_| AppError::not_found("Not Found"))?;
    if metadata.is_dir() {
        return Err(AppError::not_found("Not Found"));
    }

    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|_| AppError::not_found("Not Found"))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_for_path(relative))
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_lookup_by_extension() {
        assert_eq!(mime_for_path("index.html"), "text/html; charset=utf-8");
        assert_eq!(mime_for_path("app.JS"), "application/javascript");
        assert_eq!(mime_for_path("poster.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("movie.mp4"), "video/mp4");
        assert_eq!(mime_for_path("archive.tar.gz"), "application/octet-stream");
        assert_eq!(mime_for_path("noext"), "application/octet-stream");
    }
}
