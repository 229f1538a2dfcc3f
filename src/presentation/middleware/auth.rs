//! Authentication Middleware
//!
//! Two gates:
//! - [`auth_middleware`] for the handshake. The user credential is read from
//!   the session cookie first and the `Authorization: Bearer` header second;
//!   a rejected request never reaches the handler, so no connection is
//!   admitted.
//! - [`internal_auth_middleware`] for server-to-server routes. Only the
//!   configured service token is accepted; user credentials never pass.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::application::services::AuthError;
use crate::domain::UserIdentity;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: UserIdentity,
}

/// Pull the raw credential out of the request, if any.
pub fn extract_credential(jar: &CookieJar, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(cookie_name) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Authentication middleware that resolves the caller's identity
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credential = extract_credential(&jar, request.headers(), &state.settings.jwt.cookie_name)
        .ok_or(AuthError::MissingCredential)?;

    let identity = state.verifier.verify(&credential).await.map_err(|e| {
        tracing::debug!(error = %e, path = %request.uri().path(), "Authentication rejected");
        e
    })?;

    request.extensions_mut().insert(AuthUser { identity });

    Ok(next.run(request).await)
}

/// Header carrying the service token on internal routes
pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Service-token middleware for `/internal/*`
pub async fn internal_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.settings.internal.emit_token.as_deref() else {
        return Err(AppError::Unauthorized("Internal endpoints are disabled".into()));
    };

    let presented = request
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing service token".into()))?;

    if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        tracing::warn!(path = %request.uri().path(), "Invalid service token");
        return Err(AppError::Unauthorized("Invalid service token".into()));
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
