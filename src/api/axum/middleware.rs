use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;

use super::error::AppError;
use super::routes::AppState;
use crate::{AuthError, Identity};

/// verifies the bearer token from the `Authorization` header
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    identity: Identity,
}

impl AuthenticatedUser {
    pub fn into_inner(self) -> Identity {
        self.identity
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Missing header is `MissingCredential`; anything not starting with
/// `Bearer ` is `MalformedToken`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    value
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .ok_or(AuthError::MalformedToken)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let identity = state.tokens.verify(token, Utc::now())?;

        Ok(AuthenticatedUser { identity })
    }
}
