use crate::{
    models::HistoryEntry,
    repository::{HistoryRepository, VideoRepository},
    Error, Result,
};

/// Positions this close to a known duration count as "finished" and are
/// stored as 0 so the UI restarts the title instead of resuming the tail.
pub const COMPLETION_EPSILON_SECONDS: f64 = 5.0;

/// Apply completion normalization. Durations of 0 mean "unknown" and leave
/// the position untouched.
#[must_use]
pub fn normalize_position(position_seconds: f64, duration_seconds: i64) -> f64 {
    if duration_seconds > 0
        && position_seconds >= duration_seconds as f64 - COMPLETION_EPSILON_SECONDS
    {
        0.0
    } else {
        position_seconds
    }
}

/// Per-user playback progress on top of the history store.
pub struct HistoryService {
    history: HistoryRepository,
    videos: VideoRepository,
}

impl HistoryService {
    #[must_use]
    pub const fn new(history: HistoryRepository, videos: VideoRepository) -> Self {
        Self { history, videos }
    }

    /// Record a playback position for a known video, normalizing positions
    /// near the end to 0. Last writer wins.
    pub async fn record_progress(
        &self,
        user_id: i64,
        video_id: i64,
        position_seconds: f64,
    ) -> Result<()> {
        let video = self
            .videos
            .get_by_id(video_id)
            .await?
            .ok_or_else(|| Error::NotFound("Video not found".to_string()))?;

        let stored = normalize_position(position_seconds, video.duration_seconds);
        self.history.upsert(user_id, video_id, stored).await
    }

    /// The user's history, most recently updated first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<HistoryEntry>> {
        self.history.list(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_near_the_end_normalize_to_zero() {
        assert_eq!(normalize_position(595.0, 600), 0.0);
        assert_eq!(normalize_position(600.0, 600), 0.0);
        assert_eq!(normalize_position(590.0, 600), 0.0);
    }

    #[test]
    fn positions_before_the_epsilon_are_kept() {
        assert_eq!(normalize_position(594.9, 600), 594.9);
        assert_eq!(normalize_position(300.0, 600), 300.0);
        assert_eq!(normalize_position(0.0, 600), 0.0);
    }

    #[test]
    fn unknown_duration_skips_normalization() {
        assert_eq!(normalize_position(9999.0, 0), 9999.0);
    }
}
