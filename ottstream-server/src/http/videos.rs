// Video catalog HTTP handlers: listing, range streaming, thumbnails

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::range::{parse_range, RangeError};
use super::middleware::AuthSession;
use super::{AppError, AppResult, AppState};

const DEFAULT_PAGE_LIMIT: i64 = 12;
const MAX_PAGE_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub cursor: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRow {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub description: String,
    pub duration: i64,
    pub thumbnail_url: String,
    pub stream_url: String,
    pub resume_seconds: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub videos: Vec<VideoRow>,
    pub cursor: i64,
    pub limit: i64,
    pub next_cursor: i64,
    pub has_more: bool,
    pub query: Option<String>,
}

/// GET /api/videos - paged catalog listing with resume positions
pub async fn list(
    AuthSession(identity): AuthSession,
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<ListResponse>> {
    let Query(params) = query.map_err(|_| AppError::bad_request("Invalid query parameters"))?;

    let cursor = params.cursor.unwrap_or(0).max(0);
    let limit = match params.limit.unwrap_or(0) {
        l if l <= 0 => DEFAULT_PAGE_LIMIT,
        l => l.min(MAX_PAGE_LIMIT),
    };
    let search = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    let (rows, has_more) = state
        .catalog_service
        .list_page(identity.user_id, search.as_deref(), limit, cursor)
        .await?;

    let videos: Vec<VideoRow> = rows
        .into_iter()
        .map(|row| VideoRow {
            thumbnail_url: format!("/api/videos/{}/thumbnail", row.video.id),
            stream_url: format!("/api/videos/{}/stream", row.video.id),
            id: row.video.id,
            title: row.video.title,
            filename: row.video.filename,
            description: row.video.description.unwrap_or_default(),
            duration: row.video.duration_seconds,
            resume_seconds: row.resume_seconds,
        })
        .collect();

    let next_cursor = cursor + videos.len() as i64;
    Ok(Json(ListResponse {
        videos,
        cursor,
        limit,
        next_cursor,
        has_more,
        query: search,
    }))
}

fn parse_video_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request("Invalid video id"))
}

/// GET /api/videos/:id/stream - whole-file or single-range streaming
pub async fn stream(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let video_id = parse_video_id(&id)?;

    let video = state
        .videos
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    let path = state.media_dir.join(&video.filename);
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|_| AppError::not_found("Video not found"))?;
    if !metadata.is_file() {
        return Err(AppError::not_found("Video not found"));
    }
    let file_size = metadata.len();

    let range_header = match headers.get(header::RANGE) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::bad_request("Malformed range"))?,
        ),
        None => None,
    };

    match range_header {
        Some(raw) => {
            let (start, end) = parse_range(raw, file_size).map_err(|e| match e {
                RangeError::Malformed => AppError::bad_request("Malformed range"),
                RangeError::Unsatisfiable => AppError::range_not_satisfiable("Invalid range"),
            })?;
            let length = end - start + 1;

            let mut file = tokio::fs::File::open(&path)
                .await
                .map_err(|_| AppError::internal("Failed to open video"))?;
            file.seek(std::io::SeekFrom::Start(start))
                .await
                .map_err(|_| AppError::internal("Failed to seek video"))?;
            let body = Body::from_stream(ReaderStream::new(file.take(length)));

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, "video/mp4")
                .header(header::ACCEPT_RANGES, "bytes")
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{file_size}"),
                )
                .header(header::CONTENT_LENGTH, length)
                .body(body)
                .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
        }
        None => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|_| AppError::internal("Failed to open video"))?;
            let body = Body::from_stream(ReaderStream::new(file));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "video/mp4")
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CONTENT_LENGTH, file_size)
                .body(body)
                .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
        }
    }
}

/// GET /api/videos/:id/thumbnail - cached poster frame
pub async fn thumbnail(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let video_id = parse_video_id(&id)?;

    let video = state
        .videos
        .get_by_id(video_id)
        .await?
        .ok_or_else(|| AppError::not_found("Video not found"))?;

    let video_path = state.media_dir.join(&video.filename);
    let thumb_path = state
        .thumbnail_service
        .ensure_thumbnail(video_id, &video_path)
        .await
        .map_err(|_| AppError::internal("Thumbnail error"))?;

    let bytes = tokio::fs::read(&thumb_path)
        .await
        .map_err(|_| AppError::internal("Thumbnail error"))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CONTENT_LENGTH, bytes.len())
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {e}")))
}
