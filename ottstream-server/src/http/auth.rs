// Authentication HTTP handlers: login, register, logout, me

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::middleware::{AuthSession, SESSION_COOKIE};
use super::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub username: String,
    pub user_id: i64,
}

fn session_cookie(token: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "deleted"))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    cookie.set_expires(time::OffsetDateTime::UNIX_EPOCH);
    cookie
}

/// Login with username and password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(req) = payload.map_err(|_| AppError::bad_request("Invalid payload"))?;

    let grant = state.auth_service.login(&req.username, &req.password).await?;

    let jar = jar.add(session_cookie(&grant.token, grant.max_age_seconds));
    Ok((
        jar,
        Json(AuthResponse {
            username: grant.username,
        }),
    ))
}

/// Register a new account and issue a session exactly as login does
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let Json(req) = payload.map_err(|_| AppError::bad_request("Invalid payload"))?;

    let grant = state
        .auth_service
        .register(&req.username, &req.password, &req.confirm_password)
        .await?;

    let jar = jar.add(session_cookie(&grant.token, grant.max_age_seconds));
    Ok((
        jar,
        Json(AuthResponse {
            username: grant.username,
        }),
    ))
}

/// Revoke the current session and expire the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.auth_service.logout(cookie.value()).await {
            warn!("Failed to delete session on logout: {e}");
        }
    }
    (jar.add(expired_session_cookie()), StatusCode::NO_CONTENT)
}

/// Who am I
pub async fn me(AuthSession(identity): AuthSession) -> Json<MeResponse> {
    Json(MeResponse {
        username: identity.username,
        user_id: identity.user_id,
    })
}
