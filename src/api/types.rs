use serde::Serialize;

use crate::{AuthError, Renewed};

// Response DTOs

/// Body of a successful refresh: `{"userId", "token", "isAdmin"}`.
#[derive(Serialize)]
pub struct RefreshResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub token: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl std::fmt::Debug for RefreshResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshResponse")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

impl From<Renewed> for RefreshResponse {
    fn from(renewed: Renewed) -> Self {
        RefreshResponse {
            user_id: renewed.identity.id,
            token: renewed.token,
            is_admin: renewed.identity.is_admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        ErrorResponse {
            message: err.to_string(),
            code: err.code().to_owned(),
        }
    }
}
