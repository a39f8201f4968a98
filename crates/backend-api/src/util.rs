use axum::http::{header::AUTHORIZATION, HeaderMap};
use tutorline_chats::Caller;

use crate::{ApiError, AppState};

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn require_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let (scheme, token) = value.trim().split_once(' ').unwrap_or((value.trim(), ""));
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(token)
}

/// The authenticated caller for a request.
pub async fn caller(state: &AppState, headers: &HeaderMap) -> Result<Caller, ApiError> {
    let token = require_bearer(headers)?;
    state.authenticate(token).await
}
