//! Signing key wrapper.
//!
//! The HMAC key is process-wide configuration that must never end up in a log
//! line or a panic message, so it only ever leaves this type as raw bytes handed
//! to the MAC.

use std::fmt;

/// HMAC key material that prints as `[REDACTED]`.
///
/// # Example
///
/// ```rust
/// use bearer_auth::SigningSecret;
///
/// let secret = SigningSecret::new("my_signing_key");
///
/// assert_eq!(format!("{:?}", secret), "SigningSecret([REDACTED])");
/// assert_eq!(secret.expose_bytes(), b"my_signing_key");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw key bytes, for the MAC only.
    #[must_use]
    pub fn expose_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// An empty key still signs, but anyone can forge tokens with it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

impl fmt::Display for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SigningSecret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SigningSecret {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
