//! Bearer-token inspection.
//!
//! DESIGN
//! ======
//! Tokens are JWT-shaped (`header.payload.signature`). The client never
//! verifies signatures; it only decodes the payload to learn the expiry
//! instant so it can decide whether a stored session is still worth using.
//! Every failure mode collapses into a status value instead of an error.
//!
//! WIRE FORMAT
//! ===========
//! The canonical expiry claim is `exp` (epoch seconds). The older `expires`
//! claim is accepted as an alias so tokens from the existing backend keep
//! working.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use super::clock::now_unix_secs;

/// A decoded bearer token together with its expiry instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    /// Raw token string as issued by the identity API.
    pub token: String,
    /// Expiry instant in epoch seconds.
    pub expires_at: i64,
}

/// Outcome of inspecting a token at a given instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenStatus {
    /// Well-formed and unexpired.
    Valid(Credential),
    /// Well-formed, but the expiry instant is at or before `now`.
    Expired { expired_at: i64 },
    /// Not a decodable token, or no expiry claim.
    Malformed,
}

impl TokenStatus {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: Option<serde_json::Number>,
    /// Legacy expiry claim; `exp` wins when both are present.
    expires: Option<serde_json::Number>,
}

/// Inspect `token` against the process clock.
pub fn inspect(token: &str) -> TokenStatus {
    inspect_at(token, now_unix_secs())
}

/// Inspect `token` against an explicit `now` (epoch seconds).
///
/// A token expiring exactly at `now` is already expired.
pub fn inspect_at(token: &str, now: i64) -> TokenStatus {
    let Some(expires_at) = decode_expiry(token) else {
        return TokenStatus::Malformed;
    };
    if now < expires_at {
        TokenStatus::Valid(Credential { token: token.to_owned(), expires_at })
    } else {
        TokenStatus::Expired { expired_at: expires_at }
    }
}

/// Fail-closed validity check: absent, malformed and expired tokens are all
/// rejected.
pub fn is_valid(token: Option<&str>) -> bool {
    token.is_some_and(|t| inspect(t).is_valid())
}

/// Variant of [`is_valid`] against an explicit `now`.
pub fn is_valid_at(token: Option<&str>, now: i64) -> bool {
    token.is_some_and(|t| inspect_at(t, now).is_valid())
}

fn decode_expiry(token: &str) -> Option<i64> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return None;
    };
    if header.is_empty() || payload.is_empty() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: ExpiryClaims = serde_json::from_slice(&bytes).ok()?;
    number_to_secs(&claims.exp.or(claims.expires)?)
}

fn number_to_secs(n: &serde_json::Number) -> Option<i64> {
    if let Some(secs) = n.as_i64() {
        return Some(secs);
    }
    let secs = n.as_f64()?.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let in_range = secs.is_finite() && secs >= i64::MIN as f64 && secs <= i64::MAX as f64;
    #[allow(clippy::cast_possible_truncation)]
    in_range.then_some(secs as i64)
}
