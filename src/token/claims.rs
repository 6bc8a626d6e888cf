use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Signing algorithm. HMAC-SHA256 is the only one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "HS256")]
    Hs256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "JWT")]
    Jwt,
}

/// First token segment: `{"alg":"HS256","typ":"JWT"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub alg: Algorithm,
    pub typ: TokenType,
}

impl Header {
    pub const HS256: Header = Header {
        alg: Algorithm::Hs256,
        typ: TokenType::Jwt,
    };
}

/// Claims carried in the second token segment.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user ID.
    pub id: i64,
    /// Privilege flag.
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    /// Issued at.
    pub iat: i64,
    /// Expiry. Equals `iat + validity` at creation.
    pub exp: i64,
}

impl Claims {
    /// True once `now` has reached the expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.exp
    }

    /// True while `now` is less than `limit` past issuance.
    pub fn is_renewable_at(&self, now: DateTime<Utc>, limit: Duration) -> bool {
        now.timestamp_millis().saturating_sub(self.iat) < limit.num_milliseconds()
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// What a verified token proves about its bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    #[serde(rename = "userId")]
    pub id: i64,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Lifecycle position of a correctly signed token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Passes verification.
    Valid,
    /// Fails verification but can still be refreshed.
    ExpiredButRenewable,
    /// Neither verifies nor refreshes.
    Dead,
}
