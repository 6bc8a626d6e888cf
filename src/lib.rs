//! Stateless bearer tokens signed with HMAC-SHA256.
//!
//! A token is `header.payload.signature`, each segment URL-safe base64 without
//! padding. Nothing is stored server side: a token is valid if its signature
//! matches the shared secret and the clock is inside its window.
//!
//! ```rust
//! use bearer_auth::{TokenConfig, TokenService};
//! use chrono::Utc;
//!
//! let service = TokenService::new(TokenConfig::new("signing-key"));
//! let now = Utc::now();
//!
//! let token = service.issue(42, false, now);
//! let identity = service.verify(&token, now).unwrap();
//! assert_eq!(identity.id, 42);
//!
//! // Past its validity but still inside the renewal window.
//! let renewed = service.refresh(&token, now + chrono::Duration::minutes(20)).unwrap();
//! assert_ne!(renewed, token);
//! ```

pub mod api;
pub mod config;
pub mod secret;
pub mod token;

pub use config::TokenConfig;
pub use secret::SigningSecret;
pub use token::{Claims, Header, Identity, Renewed, TokenService, TokenState};

use std::fmt;

/// Target used for every log line emitted by this crate.
pub(crate) const LOG_TARGET: &str = "bearer_auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header on the request.
    MissingCredential,
    /// Bad `Bearer ` prefix, wrong segment count, or an undecodable segment.
    MalformedToken,
    /// The recomputed signature does not match the third segment.
    InvalidSignature,
    /// Verification at or past the payload's expiry.
    Expired,
    /// Refresh attempted after the renewal window closed.
    RenewalWindowExpired,
    /// Invalid process configuration, only raised while loading it.
    ConfigurationError(String),
}

impl AuthError {
    /// HTTP status the binding layers answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedToken
            | AuthError::InvalidSignature => 403,
            AuthError::Expired | AuthError::RenewalWindowExpired => 401,
            AuthError::ConfigurationError(_) => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "MISSING_CREDENTIAL",
            AuthError::MalformedToken => "MALFORMED_TOKEN",
            AuthError::InvalidSignature => "INVALID_SIGNATURE",
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::RenewalWindowExpired => "RENEWAL_WINDOW_EXPIRED",
            AuthError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "No token provided"),
            AuthError::MalformedToken => write!(f, "Bad token"),
            AuthError::InvalidSignature => write!(f, "Bad signature"),
            AuthError::Expired => write!(f, "Token expired."),
            AuthError::RenewalWindowExpired => write!(
                f,
                "Token has expired and cannot be refreshed, please reconnect"
            ),
            AuthError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}
