//! Media catalog synchronization.
//!
//! Keeps the `videos` table equal to the set of `.mp4` basenames in the
//! media directory: one-shot sync at startup and before every listing,
//! plus a background watcher that re-syncs on directory mtime changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    models::VideoWithResume,
    repository::{HistoryRepository, VideoRepository},
    Result,
};

/// Granularity of the watcher's sleep so shutdown stays prompt.
const WATCH_SLICE: Duration = Duration::from_millis(100);

/// Derive a display title from an on-disk basename: strip the final
/// extension, turn `_` and `-` into spaces, and fall back to the raw
/// filename when nothing remains.
#[must_use]
pub fn derive_title(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    let title: String = stem
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

fn has_mp4_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"))
}

/// Catalog engine: directory scanning, pruning, and paged listings with
/// resume positions merged in.
pub struct CatalogService {
    videos: VideoRepository,
    history: HistoryRepository,
    media_dir: PathBuf,
}

impl CatalogService {
    #[must_use]
    pub const fn new(
        videos: VideoRepository,
        history: HistoryRepository,
        media_dir: PathBuf,
    ) -> Self {
        Self {
            videos,
            history,
            media_dir,
        }
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// One-shot synchronization: upsert every non-hidden `.mp4` file, then
    /// prune rows whose file disappeared. Upsert failures abort before the
    /// prune so a transient store error cannot empty the catalog.
    pub async fn sync(&self) -> Result<usize> {
        let mut entries = tokio::fs::read_dir(&self.media_dir).await.map_err(|e| {
            warn!(
                "Failed to open media directory {}: {e}",
                self.media_dir.display()
            );
            e
        })?;

        let mut live = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if !file_type.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') || !has_mp4_extension(&name) {
                continue;
            }
            let title = derive_title(&name);
            if let Err(e) = self.videos.upsert(&title, &name, None, 0).await {
                warn!("Failed to upsert video {name}: {e}");
                return Err(e);
            }
            live.push(name);
        }

        if let Err(e) = self.videos.prune_missing(&live).await {
            warn!("Failed to prune missing videos; stale entries may remain: {e}");
        }

        debug!("Catalog sync complete: {} file(s)", live.len());
        Ok(live.len())
    }

    /// One catalog page for a user: sync first so listings never go stale,
    /// then merge the user's resume positions into the rows.
    pub async fn list_page(
        &self,
        user_id: i64,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<VideoWithResume>, bool)> {
        if let Err(e) = self.sync().await {
            warn!("Catalog sync before listing failed: {e}");
        }

        let resume = self.history.resume_positions(user_id).await?;
        let (videos, has_more) = self.videos.query(search, limit, offset).await?;

        let rows = videos
            .into_iter()
            .map(|video| {
                let resume_seconds = resume.get(&video.id).copied().unwrap_or(0.0);
                VideoWithResume {
                    video,
                    resume_seconds,
                }
            })
            .collect();

        Ok((rows, has_more))
    }
}

/// Spawn the background watcher: poll the media directory's mtime every
/// `interval`, re-sync when it changes, and remember the post-sync mtime
/// only on success so failed syncs retry on the next cycle.
pub fn spawn_watcher(
    catalog: Arc<CatalogService>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Media watcher started: {} every {}s",
            catalog.media_dir().display(),
            interval.as_secs()
        );
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            let mut slept = Duration::ZERO;
            while slept < interval {
                let slice = WATCH_SLICE.min(interval - slept);
                tokio::select! {
                    () = shutdown.cancelled() => {
                        info!("Media watcher stopped");
                        return;
                    }
                    () = tokio::time::sleep(slice) => {}
                }
                slept += slice;
            }

            let observed = directory_mtime(catalog.media_dir()).await;
            let Some(observed) = observed else {
                continue;
            };
            if last_mtime == Some(observed) {
                continue;
            }

            match catalog.sync().await {
                Ok(count) => {
                    info!("Media directory changed, re-synced {count} file(s)");
                    // Remember the mtime as observed after the sync so a
                    // mid-sync write triggers another pass.
                    last_mtime = directory_mtime(catalog.media_dir()).await.or(Some(observed));
                }
                Err(e) => {
                    warn!("Media re-sync failed, will retry: {e}");
                }
            }
        }
    })
}

async fn directory_mtime(dir: &Path) -> Option<SystemTime> {
    match tokio::fs::metadata(dir).await {
        Ok(metadata) => metadata.modified().ok(),
        Err(e) => {
            warn!("Failed to stat media directory {}: {e}", dir.display());
            None
        }
    }
}
