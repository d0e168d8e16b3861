use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ottstream_core::{
    bootstrap::{init_database, seed_default_users},
    logging,
    repository::{HistoryRepository, SessionRepository, UserRepository, VideoRepository},
    service::{
        catalog::spawn_watcher, AuthService, CatalogService, HistoryService, ThumbnailService,
    },
    Config,
};

use ottstream_server::http::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load and validate configuration (fail fast on misconfigurations)
    let config = Config::load()?;

    // 2. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("ottstream starting...");
    info!("Static directory: {}", config.static_dir.display());
    info!("Media directory: {}", config.media_dir.display());
    info!("Thumbnail directory: {}", config.thumb_dir.display());
    info!("Database path: {}", config.db_path.display());

    // 3. Open the store and apply the schema
    let pool = init_database(&config).await?;

    let users = UserRepository::new(pool.clone());
    let sessions = SessionRepository::new(pool.clone());
    let videos = VideoRepository::new(pool.clone());
    let history = HistoryRepository::new(pool.clone());

    // 4. Seed development accounts and drop stale sessions
    seed_default_users(&users)
        .await
        .context("failed to seed default users")?;

    let auth_service = Arc::new(AuthService::new(
        users,
        sessions,
        config.session_ttl_seconds(),
    ));
    let purged = auth_service
        .purge_expired_sessions()
        .await
        .context("failed to purge expired sessions")?;
    if purged > 0 {
        info!("Purged {purged} expired session(s)");
    }

    // 5. Bring the catalog in line with the media directory
    let catalog_service = Arc::new(CatalogService::new(
        videos.clone(),
        history.clone(),
        config.media_dir.clone(),
    ));
    let count = catalog_service
        .sync()
        .await
        .context("initial media synchronization failed")?;
    info!("Catalog synchronized: {count} file(s)");

    let thumbnail_service = Arc::new(ThumbnailService::new(config.thumb_dir.clone()));
    thumbnail_service
        .init()
        .await
        .context("failed to prepare thumbnail directory")?;

    let history_service = Arc::new(HistoryService::new(history, videos.clone()));

    // 6. Background watcher for media directory changes
    let shutdown = CancellationToken::new();
    let watcher = spawn_watcher(
        catalog_service.clone(),
        Duration::from_secs(config.media_watch_interval_sec),
        shutdown.clone(),
    );

    // 7. Serve until SIGINT/SIGTERM
    let state = AppState {
        auth_service,
        catalog_service,
        history_service,
        thumbnail_service,
        videos,
        media_dir: config.media_dir.clone(),
        static_dir: config.static_dir.clone(),
    };
    let app = http::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // 8. Orderly teardown: stop the watcher, then close the store
    shutdown.cancel();
    let _ = watcher.await;
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM and cancels the shutdown token so the
/// watcher stops while in-flight requests drain.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install SIGINT handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
