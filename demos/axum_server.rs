#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

//! Axum Bearer Token Server Example
//!
//! Reads `SECRET_KEY`, `TOKEN_VALIDITY_MINUTES` and `TOKEN_LIMIT_HOURS` (minutes)
//! from the environment, prints a token for user 1 and serves:
//!
//! - `GET /auth/me` - protected, echoes the bearer's identity
//! - `POST /auth/refresh-token` - exchanges a token inside its renewal window
//!
//! Run with: `SECRET_KEY=change-me cargo run --example axum_server`
//!
//! Test endpoints:
//!   curl http://localhost:8080/auth/me \
//!     -H "Authorization: Bearer <token>"
//!
//!   curl -X POST http://localhost:8080/auth/refresh-token \
//!     -H "Authorization: Bearer <token>"

use axum::Router;
use bearer_auth::api::axum::{AppState, auth_routes};
use bearer_auth::{TokenConfig, TokenService};
use chrono::Utc;
use env_logger::Env;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = TokenConfig::from_env().expect("invalid token configuration");
    let tokens = TokenService::new(config);

    println!("Token for user 1: {}", tokens.issue(1, false, Utc::now()));

    let app = Router::new()
        .nest("/auth", auth_routes())
        .with_state(AppState { tokens });

    let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
    log::info!("Listening on http://127.0.0.1:8080");
    axum::serve(listener, app).await.unwrap();
}
