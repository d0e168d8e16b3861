// HTTP middleware: session extraction and the process-wide security headers

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{header::HeaderName, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use ottstream_core::service::auth::AuthenticatedUser;

use super::{AppError, AppState};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "ott_session";

const CSP: &str = "default-src 'self'; img-src 'self' data:; media-src 'self'; \
                   style-src 'self' 'unsafe-inline'; script-src 'self';";

/// Authenticated identity extracted from the session cookie.
///
/// Rejects with 401 when the cookie is missing, unknown, or expired;
/// expired sessions are opportunistically deleted by the lookup.
pub struct AuthSession(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        let identity = state
            .auth_service
            .authenticate(&token)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

        Ok(Self(identity))
    }
}

/// Attach the security headers to every response, JSON and file alike.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static(CSP),
    );
    response
}
