use chrono::{DateTime, Utc};
use serde::Serialize;

/// One watch-history row joined with its video's title, ordered by recency
/// in listings.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub video_id: i64,
    pub position_seconds: f64,
    pub updated_at: DateTime<Utc>,
    pub title: String,
}
