//! Token configuration.
//!
//! Everything the token lifecycle depends on besides the clock lives in
//! [`TokenConfig`]: the signing secret, how long a fresh token verifies, and how
//! long after issuance it may still be refreshed. It is built once at process
//! start and handed to [`TokenService`](crate::TokenService).
//!
//! # Example
//!
//! ```rust
//! use bearer_auth::TokenConfig;
//! use chrono::Duration;
//!
//! let config = TokenConfig::new("signing-key")
//!     .with_validity(Duration::minutes(5))
//!     .with_renewal_limit(Duration::hours(12));
//!
//! assert_eq!(config.validity(), Duration::minutes(5));
//! ```

use std::fmt;

use chrono::Duration;

use crate::{AuthError, LOG_TARGET, SigningSecret};

/// HMAC key variable.
pub const SECRET_KEY_VAR: &str = "SECRET_KEY";
/// Validity window variable, in minutes.
pub const VALIDITY_VAR: &str = "TOKEN_VALIDITY_MINUTES";
/// Renewal window variable. Despite the name the value is read as minutes.
pub const RENEWAL_LIMIT_VAR: &str = "TOKEN_LIMIT_HOURS";

pub const DEFAULT_VALIDITY_MINUTES: i64 = 15;
pub const DEFAULT_RENEWAL_LIMIT_MINUTES: i64 = 24;

#[derive(Clone)]
pub struct TokenConfig {
    pub(crate) secret: SigningSecret,
    /// Default: 15 minutes.
    pub(crate) validity: Duration,
    /// Default: 24 minutes.
    pub(crate) renewal_limit: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("validity", &self.validity)
            .field("renewal_limit", &self.renewal_limit)
            .finish()
    }
}

impl TokenConfig {
    /// Creates a configuration with default windows.
    ///
    /// An empty secret is accepted, but every token signed with it is forgeable;
    /// a warning is logged.
    pub fn new(secret: impl Into<SigningSecret>) -> Self {
        let secret = secret.into();

        if secret.is_empty() {
            log::warn!(target: LOG_TARGET, "msg=\"signing secret is empty, tokens are forgeable\"");
        }

        Self {
            secret,
            validity: Duration::minutes(DEFAULT_VALIDITY_MINUTES),
            renewal_limit: Duration::minutes(DEFAULT_RENEWAL_LIMIT_MINUTES),
        }
    }

    /// Sets how long a freshly issued token passes verification.
    #[must_use]
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// Sets how long after issuance a token may be exchanged for a new one.
    #[must_use]
    pub fn with_renewal_limit(mut self, limit: Duration) -> Self {
        self.renewal_limit = limit;
        self
    }

    /// Reads `SECRET_KEY`, `TOKEN_VALIDITY_MINUTES` and `TOKEN_LIMIT_HOURS` from
    /// the process environment.
    ///
    /// `TOKEN_LIMIT_HOURS` is interpreted as a number of minutes.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` if a duration variable is not a
    /// non-negative integer.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `AuthError::ConfigurationError` if a duration variable is not a
    /// non-negative integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SECRET_KEY_VAR).unwrap_or_default();
        let validity = minutes_var(&lookup, VALIDITY_VAR, DEFAULT_VALIDITY_MINUTES)?;
        let renewal_limit = minutes_var(&lookup, RENEWAL_LIMIT_VAR, DEFAULT_RENEWAL_LIMIT_MINUTES)?;

        log::info!(
            target: LOG_TARGET,
            "msg=\"token config loaded\" validity_minutes={} renewal_limit_minutes={}",
            validity.num_minutes(),
            renewal_limit.num_minutes()
        );

        Ok(Self::new(secret)
            .with_validity(validity)
            .with_renewal_limit(renewal_limit))
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn renewal_limit(&self) -> Duration {
        self.renewal_limit
    }
}

/// Unset or blank falls back to `default`.
fn minutes_var<F>(lookup: &F, key: &str, default: i64) -> Result<Duration, AuthError>
where
    F: Fn(&str) -> Option<String>,
{
    let minutes = match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<i64>().map_err(|_| {
            AuthError::ConfigurationError(format!("{key} must be an integer, got {raw:?}"))
        })?,
        _ => default,
    };

    if minutes < 0 {
        return Err(AuthError::ConfigurationError(format!(
            "{key} must not be negative, got {minutes}"
        )));
    }

    Duration::try_minutes(minutes)
        .ok_or_else(|| AuthError::ConfigurationError(format!("{key} is out of range")))
}
