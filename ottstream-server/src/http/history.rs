// Watch-history HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::middleware::AuthSession;
use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub position: f64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    pub video_id: i64,
    pub position: f64,
    pub updated_at: String,
    pub title: String,
    pub thumbnail_url: String,
    pub stream_url: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryRow>,
}

/// POST /api/history/:id - record playback progress for a video
pub async fn update(
    AuthSession(identity): AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> AppResult<Json<StatusResponse>> {
    let video_id = id
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request("Invalid video id"))?;

    let Json(req) = payload.map_err(|_| AppError::bad_request("Missing payload"))?;
    if !req.position.is_finite() || req.position < 0.0 {
        return Err(AppError::bad_request("Invalid position"));
    }

    state
        .history_service
        .record_progress(identity.user_id, video_id, req.position)
        .await?;

    Ok(Json(StatusResponse { status: "ok" }))
}

/// GET /api/history - the user's watch history, most recent first
pub async fn list(
    AuthSession(identity): AuthSession,
    State(state): State<AppState>,
) -> AppResult<Json<HistoryResponse>> {
    let entries = state.history_service.list_for_user(identity.user_id).await?;

    let history = entries
        .into_iter()
        .map(|entry| HistoryRow {
            thumbnail_url: format!("/api/videos/{}/thumbnail", entry.video_id),
            stream_url: format!("/api/videos/{}/stream", entry.video_id),
            video_id: entry.video_id,
            position: entry.position_seconds,
            updated_at: entry.updated_at.to_rfc3339(),
            title: entry.title,
        })
        .collect();

    Ok(Json(HistoryResponse { history }))
}
