//! Unverified JWT payload inspection.
//!
//! The client only reads claims to label the signed-in user; signatures are
//! the backend's concern and are never checked here.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Map, Value};

/// Decode the payload segment of `token` into its claim map. Returns `None`
/// for anything that is not `header.payload[.signature]` with a base64url
/// JSON object payload.
pub fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// The `sub` claim, when it is a string.
pub fn subject(token: &str) -> Option<String> {
    decode_claims(token)?
        .get("sub")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
    }

    #[test]
    fn decodes_claims() {
        let claims = decode_claims(&token(r#"{"sub":"42","exp":1700000000}"#)).expect("claims");
        assert_eq!(claims["sub"], "42");
        assert_eq!(claims["exp"], 1_700_000_000);
        assert_eq!(subject(&token(r#"{"sub":"42"}"#)).as_deref(), Some("42"));
    }

    #[test]
    fn padded_payload_is_accepted() {
        let padded = format!("h.{}==.s", URL_SAFE_NO_PAD.encode(r#"{"sub":"x"}"#));
        assert!(decode_claims(&padded).is_some());
    }

    #[test]
    fn malformed_tokens_yield_none() {
        assert!(decode_claims("").is_none());
        assert!(decode_claims("onlyone").is_none());
        assert!(decode_claims("a.!!!.c").is_none());
        assert!(decode_claims(&token("[1,2]")).is_none());
        assert!(subject(&token(r#"{"sub":7}"#)).is_none());
    }
}
