//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};
use postcraft_core::{domain::Profile, ports::PortError};
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::state::AppState;

/// Reads the `session` cookie value from the request headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

/// Middleware that validates the auth session cookie and loads the user's profile.
///
/// If valid, inserts the `Profile` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse session ID from the cookie header
    let auth_session_id = session_cookie(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 2. Validate auth session in database, get user_id
    let user_id = state
        .db
        .validate_auth_session(&auth_session_id)
        .await
        .map_err(|e| {
            warn!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 3. Load the profile (cached)
    let profile = state.load_profile(user_id).await.map_err(|e| match e {
        PortError::NotFound(_) => StatusCode::UNAUTHORIZED,
        other => {
            error!("Failed to load profile for {}: {:?}", user_id, other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    })?;

    // 4. Insert the profile into request extensions and continue
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}

/// Middleware for admin-only routes. Must run after `require_auth`.
pub async fn require_admin(
    Extension(profile): Extension<Profile>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !profile.is_admin() {
        warn!(user_id = %profile.user_id, "Non-admin attempted an admin route");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; other=1"),
        );
        assert_eq!(session_cookie(&headers), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_session_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_cookie(&headers), None);
    }
}
