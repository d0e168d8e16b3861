use serde::Serialize;

/// A catalog entry backed by an on-disk `.mp4` file. `filename` is the
/// unique basename inside the media directory, never a path.
#[derive(Debug, Clone, Serialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub description: Option<String>,
    pub duration_seconds: i64,
}

/// A catalog entry merged with the requesting user's resume position,
/// as served by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VideoWithResume {
    pub video: Video,
    pub resume_seconds: f64,
}
