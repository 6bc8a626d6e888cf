use chrono::{DateTime, Duration, Utc};

use super::codec::{self, Segments};
use super::{Claims, Header, Identity, TokenState};
use crate::{AuthError, LOG_TARGET, TokenConfig};

/// A freshly minted replacement token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewed {
    pub identity: Identity,
    pub token: String,
}

/// Issues, verifies and refreshes tokens under one [`TokenConfig`].
///
/// Every method is a pure function of its arguments and the configuration, so a
/// single instance can be cloned into any number of request handlers.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Mints a token for `id` valid from `now` for the configured validity.
    ///
    /// Deterministic: the same arguments and secret always give the same token.
    pub fn issue(&self, id: i64, is_admin: bool, now: DateTime<Utc>) -> String {
        let iat = now.timestamp_millis();
        let claims = Claims {
            id,
            is_admin,
            iat,
            exp: iat.saturating_add(self.config.validity.num_milliseconds()),
        };

        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> String {
        let signing_input = format!(
            "{}.{}",
            codec::encode_segment(&Header::HS256),
            codec::encode_segment(claims)
        );
        let signature = codec::sign(&signing_input, &self.config.secret);

        format!("{signing_input}.{signature}")
    }

    /// Checks shape, decodes and checks the signature, without looking at the
    /// clock.
    ///
    /// # Errors
    /// `MalformedToken` if the token is not three non-empty segments or a
    /// segment does not decode; `InvalidSignature` if the signature differs.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let segments = Segments::split(token)?;

        let claims: Claims = codec::decode_segment(segments.payload)?;
        codec::decode_segment::<Header>(segments.header)?;

        let expected = codec::sign(segments.signing_input, &self.config.secret);
        if !codec::signature_matches(&expected, segments.signature) {
            return Err(AuthError::InvalidSignature);
        }

        Ok(claims)
    }

    /// Validates a token presented on a protected request.
    ///
    /// # Errors
    /// Any [`decode`](Self::decode) error, or `Expired` once `now` reaches the
    /// token's expiry.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "verify_token", skip_all, err)
    )]
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let result = self.decode(token).and_then(|claims| {
            if claims.is_expired_at(now) {
                Err(AuthError::Expired)
            } else {
                Ok(claims.identity())
            }
        });

        if let Err(err) = &result {
            log::debug!(target: LOG_TARGET, "msg=\"token rejected\" operation=\"verify\" reason=\"{}\"", err.code());
        }

        result
    }

    /// Exchanges a token for a new one with a fresh validity window.
    ///
    /// The old token may already be expired; it only has to be younger than the
    /// renewal limit. Its timestamps are discarded.
    ///
    /// # Errors
    /// Any [`decode`](Self::decode) error, or `RenewalWindowExpired` once `now`
    /// is the renewal limit or more past the token's issuance.
    pub fn refresh(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.renew(token, now).map(|renewed| renewed.token)
    }

    /// [`refresh`](Self::refresh), also returning whom the new token is for.
    ///
    /// # Errors
    /// Same as [`refresh`](Self::refresh).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "refresh_token", skip_all, err)
    )]
    pub fn renew(&self, token: &str, now: DateTime<Utc>) -> Result<Renewed, AuthError> {
        let claims = match self.decode(token) {
            Ok(claims) if claims.is_renewable_at(now, self.config.renewal_limit) => claims,
            Ok(_) => {
                log::debug!(target: LOG_TARGET, "msg=\"token rejected\" operation=\"refresh\" reason=\"RENEWAL_WINDOW_EXPIRED\"");
                return Err(AuthError::RenewalWindowExpired);
            }
            Err(err) => {
                log::debug!(target: LOG_TARGET, "msg=\"token rejected\" operation=\"refresh\" reason=\"{}\"", err.code());
                return Err(err);
            }
        };

        log::info!(
            target: LOG_TARGET,
            "msg=\"token refreshed\" user_id={} is_admin={}",
            claims.id,
            claims.is_admin
        );

        Ok(Renewed {
            identity: claims.identity(),
            token: self.issue(claims.id, claims.is_admin, now),
        })
    }

    /// Where a correctly signed token sits in its lifecycle at `now`.
    ///
    /// # Errors
    /// Any [`decode`](Self::decode) error.
    pub fn status(&self, token: &str, now: DateTime<Utc>) -> Result<TokenState, AuthError> {
        let claims = self.decode(token)?;

        Ok(if !claims.is_expired_at(now) {
            TokenState::Valid
        } else if claims.is_renewable_at(now, self.config.renewal_limit) {
            TokenState::ExpiredButRenewable
        } else {
            TokenState::Dead
        })
    }

    pub fn validity(&self) -> Duration {
        self.config.validity()
    }

    pub fn renewal_limit(&self) -> Duration {
        self.config.renewal_limit()
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const MINUTE: i64 = 60_000;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret"))
    }

    fn claims_of(token: &str) -> Claims {
        let payload = token.split('.').nth(1).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
    }

    /// Token with arbitrary payload bytes, correctly signed.
    fn signed_with_payload(service: &TokenService, payload: &[u8]) -> String {
        let signing_input = format!(
            "{}.{}",
            codec::encode_segment(&Header::HS256),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = codec::sign(&signing_input, &service.config.secret);
        format!("{signing_input}.{signature}")
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let now = at(1_700_000_000_000);

        let token = service.issue(42, true, now);
        let identity = service.verify(&token, now).unwrap();

        assert_eq!(identity.id, 42);
        assert!(identity.is_admin);
    }

    #[test]
    fn test_round_trip_various_subjects() {
        let service = service();
        for (id, is_admin) in [(0, false), (-1, true), (i64::MAX, false), (123_456, true)] {
            let token = service.issue(id, is_admin, at(0));
            assert_eq!(
                service.verify(&token, at(0)).unwrap(),
                Identity { id, is_admin }
            );
        }
    }

    #[test]
    fn test_issued_claims() {
        let service = service();
        let token = service.issue(9, false, at(5_000));
        let claims = claims_of(&token);

        assert_eq!(claims.iat, 5_000);
        assert_eq!(claims.exp, 5_000 + 15 * MINUTE);
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(
            token.split('.').next().unwrap(),
            "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let token = service.issue(1, false, at(0));

        assert!(service.verify(&token, at(899_999)).is_ok());
        assert_eq!(
            service.verify(&token, at(900_000)).unwrap_err(),
            AuthError::Expired
        );
    }

    #[test]
    fn test_custom_validity() {
        let service =
            TokenService::new(TokenConfig::new("test-secret").with_validity(Duration::minutes(1)));
        let token = service.issue(1, false, at(0));

        assert!(service.verify(&token, at(MINUTE - 1)).is_ok());
        assert_eq!(
            service.verify(&token, at(MINUTE)).unwrap_err(),
            AuthError::Expired
        );
    }

    #[test]
    fn test_renewal_boundary() {
        let service = service();
        let token = service.issue(1, false, at(0));

        assert!(service.refresh(&token, at(24 * MINUTE - 1)).is_ok());
        assert_eq!(
            service.refresh(&token, at(24 * MINUTE)).unwrap_err(),
            AuthError::RenewalWindowExpired
        );
    }

    #[test]
    fn test_refresh_expired_but_renewable() {
        let service = service();
        let token = service.issue(5, true, at(0));
        let now = at(20 * MINUTE);

        assert_eq!(service.verify(&token, now).unwrap_err(), AuthError::Expired);

        let renewed = service.refresh(&token, now).unwrap();
        let identity = service.verify(&renewed, now).unwrap();
        assert_eq!(identity, Identity { id: 5, is_admin: true });
    }

    #[test]
    fn test_refresh_valid_token() {
        let service = service();
        let token = service.issue(5, false, at(0));

        let renewed = service.refresh(&token, at(MINUTE)).unwrap();
        assert_ne!(renewed, token);
        assert_eq!(claims_of(&renewed).iat, MINUTE);
    }

    #[test]
    fn test_refresh_independence() {
        let service = service();
        let token = service.issue(5, false, at(0));
        let refreshed_at = 20 * MINUTE;

        let renewed = service.refresh(&token, at(refreshed_at)).unwrap();
        let claims = claims_of(&renewed);

        assert_eq!(claims.iat, refreshed_at);
        assert_eq!(claims.exp, refreshed_at + 15 * MINUTE);
        assert!(service.verify(&renewed, at(refreshed_at + 15 * MINUTE - 1)).is_ok());

        // The renewed token gets its own renewal window too.
        assert!(service.refresh(&renewed, at(refreshed_at + 23 * MINUTE)).is_ok());
    }

    #[test]
    fn test_refresh_rejects_bad_tokens() {
        let service = service();
        let other = TokenService::new(TokenConfig::new("other-secret"));
        let token = other.issue(1, false, at(0));

        assert_eq!(
            service.refresh(&token, at(0)).unwrap_err(),
            AuthError::InvalidSignature
        );
        assert_eq!(
            service.refresh("a.b", at(0)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_renew_returns_identity() {
        let service = service();
        let token = service.issue(11, true, at(0));

        let renewed = service.renew(&token, at(16 * MINUTE)).unwrap();
        assert_eq!(renewed.identity, Identity { id: 11, is_admin: true });
        assert_eq!(
            service.verify(&renewed.token, at(16 * MINUTE)).unwrap(),
            renewed.identity
        );
    }

    #[test]
    fn test_determinism() {
        let service = service();
        let a = service.issue(7, true, at(123));
        let b = service.issue(7, true, at(123));
        assert_eq!(a, b);
    }

    #[test]
    fn test_secret_changes_only_signature() {
        let first = service();
        let second = TokenService::new(TokenConfig::new("another-secret"));

        let a = first.issue(7, true, at(123));
        let b = second.issue(7, true, at(123));

        let a_parts: Vec<&str> = a.split('.').collect();
        let b_parts: Vec<&str> = b.split('.').collect();
        assert_eq!(a_parts[0], b_parts[0]);
        assert_eq!(a_parts[1], b_parts[1]);
        assert_ne!(a_parts[2], b_parts[2]);
    }

    #[test]
    fn test_wrong_secret() {
        let token = service().issue(42, false, at(0));
        let other = TokenService::new(TokenConfig::new("another-secret"));

        assert_eq!(
            other.verify(&token, at(0)).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_tamper_any_byte() {
        let service = service();
        let token = service.issue(42, true, at(0));

        for (i, original) in token.char_indices() {
            for replacement in ['A', 'z', '_', '.'] {
                if replacement == original {
                    continue;
                }
                let mut tampered = token.clone();
                tampered.replace_range(i..=i, &replacement.to_string());

                let err = service.verify(&tampered, at(0)).unwrap_err();
                assert!(
                    matches!(err, AuthError::MalformedToken | AuthError::InvalidSignature),
                    "byte {i} -> {replacement:?} gave {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_forged_claims_rejected() {
        let service = service();
        let token = service.issue(1, false, at(0));
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = codec::encode_segment(&Claims {
            id: 1,
            is_admin: true,
            iat: 0,
            exp: 15 * MINUTE,
        });
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            service.verify(&forged, at(0)).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_malformed_matrix() {
        let service = service();
        let not_json = format!(
            "{}.{}.{}",
            codec::encode_segment(&Header::HS256),
            URL_SAFE_NO_PAD.encode("not json"),
            "c2lnbmF0dXJl"
        );

        for token in ["", "abc", "abc.def", "a.b.c.d", "..", "a..c", "a.@@@.c", not_json.as_str()] {
            assert_eq!(
                service.verify(token, at(0)).unwrap_err(),
                AuthError::MalformedToken,
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_payload_decoded_before_signature_check() {
        let service = service();

        let not_json = signed_with_payload(&service, b"not json");
        assert_eq!(
            service.verify(&not_json, at(0)).unwrap_err(),
            AuthError::MalformedToken
        );

        let missing_field = signed_with_payload(&service, br#"{"id":1,"isAdmin":false,"iat":0}"#);
        assert_eq!(
            service.verify(&missing_field, at(0)).unwrap_err(),
            AuthError::MalformedToken
        );

        let mistyped =
            signed_with_payload(&service, br#"{"id":1,"isAdmin":"yes","iat":0,"exp":1}"#);
        assert_eq!(
            service.verify(&mistyped, at(0)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_foreign_header_rejected() {
        let service = service();
        let token = service.issue(1, false, at(0));
        let payload = token.split('.').nth(1).unwrap();

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let signing_input = format!("{header}.{payload}");
        let signature = codec::sign(&signing_input, &service.config.secret);

        assert_eq!(
            service
                .verify(&format!("{signing_input}.{signature}"), at(0))
                .unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_decode_ignores_clock() {
        let service = service();
        let token = service.issue(3, false, at(0));

        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.identity(), Identity { id: 3, is_admin: false });
        assert_eq!(claims.exp, 15 * MINUTE);
    }

    #[test]
    fn test_status_transitions() {
        let service = service();
        let token = service.issue(1, false, at(0));

        assert_eq!(service.status(&token, at(0)).unwrap(), TokenState::Valid);
        assert_eq!(
            service.status(&token, at(15 * MINUTE)).unwrap(),
            TokenState::ExpiredButRenewable
        );
        assert_eq!(
            service.status(&token, at(24 * MINUTE)).unwrap(),
            TokenState::Dead
        );
        assert_eq!(
            service.status("garbage", at(0)).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn test_renewal_shorter_than_validity() {
        let config = TokenConfig::new("test-secret")
            .with_validity(Duration::minutes(30))
            .with_renewal_limit(Duration::minutes(10));
        let service = TokenService::new(config);
        let token = service.issue(1, false, at(0));

        assert!(service.verify(&token, at(20 * MINUTE)).is_ok());
        assert_eq!(
            service.refresh(&token, at(20 * MINUTE)).unwrap_err(),
            AuthError::RenewalWindowExpired
        );
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let service = TokenService::new(TokenConfig::new(""));
        let token = service.issue(1, false, at(0));
        assert!(service.verify(&token, at(0)).is_ok());
    }

    #[test]
    fn test_concurrent_use() {
        let service = service();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                std::thread::spawn(move || {
                    let token = service.issue(i, i % 2 == 0, at(0));
                    service.verify(&token, at(1)).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let identity = handle.join().unwrap();
            assert_eq!(identity.id, i as i64);
        }
    }
}
