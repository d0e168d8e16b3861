//! Lazy thumbnail cache backed by an external encoder.
//!
//! A poster frame lives at `<thumb_dir>/<video_id>.jpg` and is regenerated
//! whenever the source file is newer than the cached frame. Generation for
//! the same id is serialized so concurrent cache misses cannot race on the
//! destination file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::process::Command;
use tracing::error;

use crate::{Error, Result};

/// Default encoder binary, looked up on PATH.
const DEFAULT_ENCODER: &str = "ffmpeg";

pub struct ThumbnailService {
    thumb_dir: PathBuf,
    encoder: String,
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ThumbnailService {
    #[must_use]
    pub fn new(thumb_dir: PathBuf) -> Self {
        Self::with_encoder(thumb_dir, DEFAULT_ENCODER)
    }

    #[must_use]
    pub fn with_encoder(thumb_dir: PathBuf, encoder: impl Into<String>) -> Self {
        Self {
            thumb_dir,
            encoder: encoder.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create the cache directory. Called once at startup.
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.thumb_dir).await?;
        Ok(())
    }

    #[must_use]
    pub fn cache_path(&self, video_id: i64) -> PathBuf {
        self.thumb_dir.join(format!("{video_id}.jpg"))
    }

    /// Return the path of a fresh thumbnail for `video_id`, generating it
    /// from `video_path` when the cache is missing or stale.
    pub async fn ensure_thumbnail(&self, video_id: i64, video_path: &Path) -> Result<PathBuf> {
        let thumb_path = self.cache_path(video_id);

        let source_mtime = tokio::fs::metadata(video_path).await?.modified()?;
        if is_fresh(&thumb_path, source_mtime).await {
            return Ok(thumb_path);
        }

        let lock = self.lock_for(video_id);
        let _guard = lock.lock().await;

        // Another task may have generated the frame while we waited.
        if is_fresh(&thumb_path, source_mtime).await {
            return Ok(thumb_path);
        }

        self.generate(video_path, &thumb_path).await?;
        Ok(thumb_path)
    }

    async fn generate(&self, video_path: &Path, thumb_path: &Path) -> Result<()> {
        let status = Command::new(&self.encoder)
            .arg("-y")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg("5")
            .arg("-i")
            .arg(video_path)
            .arg("-vframes")
            .arg("1")
            .arg("-vf")
            .arg("scale=320:-1")
            .arg(thumb_path)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => {
                error!(
                    "{} failed to generate thumbnail for {} (exit {status})",
                    self.encoder,
                    video_path.display()
                );
                let _ = tokio::fs::remove_file(thumb_path).await;
                Err(Error::Internal("Thumbnail generation failed".to_string()))
            }
            Err(e) => {
                error!("Failed to run {}: {e}", self.encoder);
                let _ = tokio::fs::remove_file(thumb_path).await;
                Err(Error::Internal("Thumbnail generation failed".to_string()))
            }
        }
    }

    fn lock_for(&self, video_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(video_id).or_default().clone()
    }
}

/// A cached frame is fresh when it exists and is at least as new as the
/// source.
async fn is_fresh(thumb_path: &Path, source_mtime: std::time::SystemTime) -> bool {
    match tokio::fs::metadata(thumb_path).await {
        Ok(metadata) => metadata
            .modified()
            .map(|mtime| mtime >= source_mtime)
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn fresh_cache_skips_the_encoder() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        tokio::fs::write(&video, b"data").await.unwrap();

        // An encoder that would fail if invoked
        let service = ThumbnailService::with_encoder(dir.path().to_path_buf(), "false");
        service.init().await.unwrap();

        // Seed a cache file newer than the source
        let cached = service.cache_path(7);
        tokio::fs::write(&cached, b"jpg").await.unwrap();

        let path = service.ensure_thumbnail(7, &video).await.unwrap();
        assert_eq!(path, cached);
    }

    #[tokio::test]
    async fn failed_encoder_removes_partial_output() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        tokio::fs::write(&video, b"data").await.unwrap();

        let service = ThumbnailService::with_encoder(dir.path().to_path_buf(), "false");
        service.init().await.unwrap();

        // Simulate a stale partial file the failed run must clean up
        let cached = service.cache_path(3);
        tokio::fs::write(&cached, b"partial").await.unwrap();
        let old = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        let file = std::fs::File::options().write(true).open(&cached).unwrap();
        file.set_modified(old).unwrap();
        drop(file);

        let result = service.ensure_thumbnail(3, &video).await;
        assert!(result.is_err());
        assert!(!cached.exists());
    }

    #[tokio::test]
    async fn successful_encoder_exit_is_accepted() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("movie.mp4");
        tokio::fs::write(&video, b"data").await.unwrap();

        // "true" exits 0 without producing a file; the service only
        // contracts on the exit status.
        let service = ThumbnailService::with_encoder(dir.path().to_path_buf(), "true");
        service.init().await.unwrap();

        let path = service.ensure_thumbnail(9, &video).await.unwrap();
        assert_eq!(path, service.cache_path(9));
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempdir().unwrap();
        let service = ThumbnailService::with_encoder(dir.path().to_path_buf(), "true");
        service.init().await.unwrap();

        let result = service
            .ensure_thumbnail(1, &dir.path().join("missing.mp4"))
            .await;
        assert!(result.is_err());
    }
}
