//! Minimal JWT claim inspection.
//!
//! The signature is never checked here; the backend stays the authority.
//! This only lets startup skip a credential that has visibly expired.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    sub: Option<String>,
}

fn decode_claims(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let raw = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&raw).ok()
}

/// True only when the token carries an `exp` claim that lies in the past.
/// Opaque or undecodable tokens are never considered expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    decode_claims(token)
        .and_then(|claims| claims.exp)
        .is_some_and(|exp| exp <= now.timestamp())
}

/// Subject claim (the username for this backend), when present
pub fn subject(token: &str) -> Option<String> {
    decode_claims(token).and_then(|claims| claims.sub)
}

#[cfg(test)]
pub(crate) fn make_token(sub: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}
