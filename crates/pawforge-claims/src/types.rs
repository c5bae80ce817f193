//! Claim payload types and validation summaries.
//!
//! These are the structures recovered from a token's middle segment.
//! They're "read-side" types only — this client never mints tokens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default proactive-refresh threshold: refresh tokens that expire
/// within the next 5 minutes.
pub const DEFAULT_REFRESH_THRESHOLD_MS: u64 = 5 * 60 * 1000;

/// The decoded claims of a bearer token.
///
/// The well-known registered claims get typed fields; everything else
/// the issuer put in the payload lands in `extra` via
/// `#[serde(flatten)]`, so no information is lost on decode. The
/// session manager reads `extra` for fallback identity fields
/// (`userId`, `id`, `_id`) and for `iss`/`aud` metadata.
///
/// Claims are **assertions, not authorization**: a token lacking `exp`
/// is treated as never expiring. That is a conscious policy (the issuer
/// controls token lifetimes, and "cannot determine" must not log users
/// out), not a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, in **seconds** since the Unix epoch. Absent ⇒ the token
    /// never expires from the client's point of view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued-at, in seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Subject — the primary identity field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// The account email, when the issuer includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Every other claim, preserved as raw JSON.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Claims {
    /// Looks up a non-registered claim by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// The full validation verdict for a token, computed in one pass.
///
/// Callers that only need one answer should use the single-purpose
/// functions ([`is_expired`](crate::is_expired), etc.); this summary
/// exists for UI code that wants to show expiry info and an error
/// message together.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenValidation {
    /// `true` iff the token decoded AND is not expired.
    pub is_valid: bool,

    /// `true` only when the token decoded and its `exp` has passed.
    /// A token that failed to decode is **not** "expired" — decode
    /// failure and expiry are distinct signals, and conflating them
    /// would make the UI show "session expired" for garbage input.
    pub is_expired: bool,

    /// Expiry instant in epoch milliseconds, if the token carries `exp`.
    pub expires_at: Option<u64>,

    /// Milliseconds until expiry, clamped to ≥ 0.
    /// 0 for expired or undecodable tokens.
    pub expires_in_ms: u64,

    /// The decoded claims, when decoding succeeded.
    pub claims: Option<Claims>,

    /// A short human-readable reason when `is_valid` is false because
    /// of a structural problem (not mere expiry).
    pub error: Option<String>,
}

/// Issuer-side metadata extracted from a token's claims.
///
/// `issuer`/`audience` are included only when present *and*
/// string-typed — a numeric or array `aud` is ignored rather than
/// stringified. Timestamps are epoch milliseconds, `None` when the
/// corresponding claim is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub issued_at: Option<u64>,
    pub expires_at: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialize_preserves_extra_fields() {
        let json = r#"{"sub":"u1","exp":100,"role":"admin","iss":"pawforge"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.exp, Some(100));
        assert_eq!(claims.get("role"), Some(&Value::String("admin".into())));
        assert_eq!(claims.get("iss"), Some(&Value::String("pawforge".into())));
    }

    #[test]
    fn test_claims_deserialize_all_registered_fields_optional() {
        // An empty payload is still a valid claims object.
        let claims: Claims = serde_json::from_str("{}").unwrap();
        assert!(claims.exp.is_none());
        assert!(claims.iat.is_none());
        assert!(claims.sub.is_none());
        assert!(claims.email.is_none());
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_claims_round_trip() {
        let json = r#"{"exp":1700000000,"iat":1699990000,"sub":"abc","email":"a@b.c","aud":"mobile"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        let back = serde_json::to_string(&claims).unwrap();
        let again: Claims = serde_json::from_str(&back).unwrap();
        assert_eq!(claims, again);
    }
}
