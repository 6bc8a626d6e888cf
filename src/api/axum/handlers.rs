//! HTTP handlers for the token endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;

use super::error::AppError;
use super::middleware::{AuthenticatedUser, extract_bearer_token};
use super::routes::AppState;
use crate::Identity;
use crate::api::RefreshResponse;

/// Exchange the presented token for a fresh one.
///
/// POST /refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = extract_bearer_token(&headers)?;
    let renewed = state.tokens.renew(token, Utc::now())?;

    Ok(Json(RefreshResponse::from(renewed)))
}

/// Who the bearer is.
///
/// GET /me
pub async fn current_user(user: AuthenticatedUser) -> Json<Identity> {
    Json(user.into_inner())
}
