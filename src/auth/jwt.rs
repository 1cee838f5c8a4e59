//! Unverified JWT payload decoding
//!
//! The signature is never checked. Claims read here only drive what the
//! client shows and where it navigates; the API enforces the real rules.

use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::{Map, Value};

/// Standard alphabet that, like browser `atob`, ignores stray bits in the
/// final character.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decoded token payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `exp` claim in Unix seconds. Accepts integer, float or numeric string.
    pub fn expires_at(&self) -> Option<f64> {
        let exp = self.0.get("exp")?;
        exp.as_f64()
            .or_else(|| exp.as_str().and_then(|s| s.trim().parse().ok()))
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// Any structural, base64 or JSON problem yields `None`.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }

    let mut payload = segments[1].replace('-', "+").replace('_', "/");
    let pad = (4 - payload.len() % 4) % 4;
    payload.extend(std::iter::repeat('=').take(pad));

    let bytes = match LENIENT.decode(payload.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Token payload is not base64: {}", e);
            return None;
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Some(Claims(map)),
        Ok(_) => {
            tracing::debug!("Token payload is not a JSON object");
            None
        }
        Err(e) => {
            tracing::debug!("Token payload is not JSON: {}", e);
            None
        }
    }
}
