//! JWT claim inspection.
//!
//! The client never verifies signatures (the backend does that); it only
//! reads the `exp` claim out of the payload segment to decide whether a
//! token is worth sending. Anything that cannot be decoded is treated as
//! already expired.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Extract the `exp` claim (Unix seconds) from a JWT, if it has one.
pub fn decode_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

/// Whether the token's `exp` claim is at or before the current time.
///
/// Fails closed: a token with no decodable `exp` counts as expired.
pub fn is_expired(token: &str) -> bool {
    match decode_expiry(token) {
        Some(exp) => exp <= chrono::Utc::now().timestamp(),
        None => true,
    }
}
