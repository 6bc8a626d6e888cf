//! Segment encoding and HMAC-SHA256 signing.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::{AuthError, SigningSecret};

type HmacSha256 = Hmac<Sha256>;

/// A token split into its three parts, borrowed from the input.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segments<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
    /// `header.payload`, the bytes the signature covers.
    pub signing_input: &'a str,
}

impl<'a> Segments<'a> {
    /// Requires exactly three non-empty dot-separated segments.
    pub fn split(token: &'a str) -> Result<Self, AuthError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::MalformedToken)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(AuthError::MalformedToken)?;

        if header.is_empty() || payload.is_empty() || signature.is_empty() || payload.contains('.')
        {
            return Err(AuthError::MalformedToken);
        }

        Ok(Self {
            header,
            payload,
            signature,
            signing_input,
        })
    }
}

/// JSON, then URL-safe base64 without padding.
pub(crate) fn encode_segment<T: Serialize>(value: &T) -> String {
    // Only called with `Header` and `Claims`: plain structs of enums, integers
    // and booleans, which serde_json always serializes.
    #[allow(clippy::expect_used)]
    let json = serde_json::to_vec(value).expect("token segments always serialize");
    URL_SAFE_NO_PAD.encode(json)
}

pub(crate) fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}

/// Signature segment for `signing_input`, encoded like the other segments.
pub(crate) fn sign(signing_input: &str, secret: &SigningSecret) -> String {
    URL_SAFE_NO_PAD.encode(compute_hmac(
        signing_input.as_bytes(),
        secret.expose_bytes(),
    ))
}

/// Compares the full encoded signature strings without early exit.
pub(crate) fn signature_matches(expected: &str, actual: &str) -> bool {
    constant_time_eq(expected.as_bytes(), actual.as_bytes())
}

fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, including empty ones.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
