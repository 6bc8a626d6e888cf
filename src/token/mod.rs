//! Token lifecycle: issue, verify, refresh.
//!
//! A token moves through three states as the clock advances:
//!
//! ```text
//! Valid --(now >= exp)--> ExpiredButRenewable --(now - iat >= renewal limit)--> Dead
//! ```
//!
//! `verify` accepts only `Valid`; `refresh` accepts `Valid` and
//! `ExpiredButRenewable` and returns a brand-new token.
//!
//! # Example
//!
//! ```rust
//! use bearer_auth::{AuthError, TokenConfig, TokenService, TokenState};
//! use chrono::{Duration, Utc};
//!
//! let service = TokenService::new(
//!     TokenConfig::new("signing-key")
//!         .with_validity(Duration::minutes(15))
//!         .with_renewal_limit(Duration::minutes(24)),
//! );
//!
//! let issued_at = Utc::now();
//! let token = service.issue(7, true, issued_at);
//!
//! let later = issued_at + Duration::minutes(16);
//! assert_eq!(service.verify(&token, later), Err(AuthError::Expired));
//! assert_eq!(service.status(&token, later), Ok(TokenState::ExpiredButRenewable));
//!
//! let renewed = service.refresh(&token, later).unwrap();
//! assert!(service.verify(&renewed, later).is_ok());
//! ```

mod claims;
mod codec;
mod service;

pub use claims::{Algorithm, Claims, Header, Identity, TokenState, TokenType};
pub use service::{Renewed, TokenService};
