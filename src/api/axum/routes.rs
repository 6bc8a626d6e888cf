use axum::Router;
use axum::routing::{get, post};

use super::handlers;
use crate::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().merge(public_routes()).merge(private_routes())
}

/// expired tokens are still accepted here, within the renewal window
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/refresh-token", post(handlers::refresh_token))
}

pub fn private_routes() -> Router<AppState> {
    Router::new().route("/me", get(handlers::current_user))
}
