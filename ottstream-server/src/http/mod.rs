// Module: http
// axum router, shared state, and the handler modules

pub mod auth;
pub mod error;
pub mod history;
pub mod middleware;
pub mod range;
pub mod static_files;
pub mod videos;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use ottstream_core::{
    repository::VideoRepository,
    service::{AuthService, CatalogService, HistoryService, ThumbnailService},
};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub catalog_service: Arc<CatalogService>,
    pub history_service: Arc<HistoryService>,
    pub thumbnail_service: Arc<ThumbnailService>,
    pub videos: VideoRepository,
    pub media_dir: PathBuf,
    pub static_dir: PathBuf,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Authentication routes
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Catalog routes
        .route("/api/videos", get(videos::list))
        .route("/api/videos/:id/stream", get(videos::stream))
        .route("/api/videos/:id/thumbnail", get(videos::thumbnail))
        // History routes
        .route("/api/history", get(history::list))
        .route("/api/history/:id", post(history::update))
        // Unknown /api routes 404 inside the fallback; everything else is
        // served from the static directory
        .fallback(static_files::serve)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::security_headers))
}
