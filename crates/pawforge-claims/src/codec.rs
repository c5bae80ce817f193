//! Token decoding and expiry arithmetic.
//!
//! A compact bearer token is three base64url segments joined by dots:
//! `header.payload.signature`. Only the payload is interesting here —
//! the header is opaque and the signature is intentionally not checked
//! (see the crate docs for the trust model).
//!
//! Every function comes in two flavors where time matters:
//! - a convenience form that reads the wall clock, and
//! - an `*_at(token, now_ms)` form taking an explicit timestamp.
//!
//! The `_at` forms exist so tests (and callers that already sampled the
//! clock) get deterministic answers; the wall-clock forms just delegate.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::types::{Claims, TokenMetadata, TokenValidation, DEFAULT_REFRESH_THRESHOLD_MS};

/// Seconds-precision claim value to epoch milliseconds. Claims are
/// attacker-controlled numbers; an absurdly large `exp` or `iat` must
/// saturate, not wrap.
fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(1000)
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a token's payload segment into [`Claims`].
///
/// Returns `None` — never panics, never errors — when:
/// - the token does not have exactly three dot-separated segments,
/// - the payload is not valid base64url (padded or unpadded), or
/// - the decoded bytes are not a JSON object matching [`Claims`].
pub fn decode(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = decode_segment(payload)?;
    serde_json::from_slice(&bytes).ok()
}

/// Base64url-decodes one segment, tolerating both padded and unpadded
/// input (issuers differ; the standard alphabet's `+`/`/` are not
/// accepted — tokens are URL-safe by definition).
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD.decode(trimmed).ok()
}

// ---------------------------------------------------------------------------
// Expiry arithmetic
// ---------------------------------------------------------------------------

/// Whether the token has expired as of `now_ms`.
///
/// "Cannot determine" is **not** expired: an undecodable token or one
/// without an `exp` claim reports `false`. Expiry is a timing signal
/// for the UI, and guessing "expired" on garbage would log users out
/// spuriously; the server remains the authority either way.
pub fn is_expired_at(token: &str, now_ms: u64) -> bool {
    match decode(token).and_then(|c| c.exp) {
        Some(exp_secs) => now_ms >= secs_to_ms(exp_secs),
        None => false,
    }
}

/// Whether the token has expired right now.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_ms())
}

/// The token's expiry instant in epoch milliseconds, if it has one.
pub fn expires_at(token: &str) -> Option<u64> {
    decode(token).and_then(|c| c.exp).map(secs_to_ms)
}

/// Milliseconds until expiry as of `now_ms`, clamped to ≥ 0.
///
/// Returns 0 for expired tokens, undecodable tokens, and tokens with
/// no `exp` claim. Callers must not treat 0 as "refresh immediately" —
/// see [`should_refresh_within`].
pub fn expires_in_at(token: &str, now_ms: u64) -> u64 {
    match expires_at(token) {
        Some(at) => at.saturating_sub(now_ms),
        None => 0,
    }
}

/// Milliseconds until expiry, measured from the wall clock.
pub fn expires_in(token: &str) -> u64 {
    expires_in_at(token, now_ms())
}

// ---------------------------------------------------------------------------
// Refresh decision
// ---------------------------------------------------------------------------

/// Whether the token is due for a **proactive** refresh: still alive,
/// but expiring within `threshold_ms`.
///
/// True iff `0 < expires_in < threshold_ms` — both bounds strict. An
/// already-expired token returns `false`: rescuing a dead token is a
/// different code path (re-auth or refresh-with-retry) from quietly
/// rotating a live one, and callers must treat `is_expired` and
/// `should_refresh` as non-overlapping signals. A token expiring in
/// exactly `threshold_ms` is likewise excluded.
pub fn should_refresh_within(token: &str, threshold_ms: u64, now_ms: u64) -> bool {
    let remaining = expires_in_at(token, now_ms);
    remaining > 0 && remaining < threshold_ms
}

/// [`should_refresh_within`] with the default 5-minute threshold and
/// the wall clock.
pub fn should_refresh(token: &str) -> bool {
    should_refresh_within(token, DEFAULT_REFRESH_THRESHOLD_MS, now_ms())
}

// ---------------------------------------------------------------------------
// Validation summary
// ---------------------------------------------------------------------------

/// Computes the full [`TokenValidation`] verdict as of `now_ms`.
pub fn validate_at(token: &str, now_ms: u64) -> TokenValidation {
    let Some(claims) = decode(token) else {
        return TokenValidation {
            is_valid: false,
            // Decode failure is not expiry; the distinction matters to
            // callers deciding between "re-login" and "bad token" UX.
            is_expired: false,
            expires_at: None,
            expires_in_ms: 0,
            claims: None,
            error: Some("Invalid token format".to_string()),
        };
    };

    let expires_at = claims.exp.map(secs_to_ms);
    let is_expired = matches!(expires_at, Some(at) if now_ms >= at);
    let expires_in_ms = expires_at
        .map(|at| at.saturating_sub(now_ms))
        .unwrap_or(0);

    TokenValidation {
        is_valid: !is_expired,
        is_expired,
        expires_at,
        expires_in_ms,
        claims: Some(claims),
        error: None,
    }
}

/// [`validate_at`] against the wall clock.
pub fn validate(token: &str) -> TokenValidation {
    validate_at(token, now_ms())
}

// ---------------------------------------------------------------------------
// Identity and metadata claims
// ---------------------------------------------------------------------------

/// Extracts the user's identity from the token.
///
/// Checks `sub` first, then the fallback fields issuers in the wild
/// use: `userId`, `id`, `_id` — string-typed values only. A numeric
/// `id` claim is ignored rather than stringified, so two issuers with
/// different conventions can't silently collide.
pub fn user_id(token: &str) -> Option<String> {
    let claims = decode(token)?;
    if let Some(sub) = claims.sub {
        return Some(sub);
    }
    for key in ["userId", "id", "_id"] {
        if let Some(value) = claims.get(key).and_then(|v| v.as_str()) {
            return Some(value.to_string());
        }
    }
    None
}

/// Extracts issuer-side metadata from the token.
///
/// Returns `None` only when the token doesn't decode at all. Within a
/// decoded token, each field is independently optional.
pub fn metadata(token: &str) -> Option<TokenMetadata> {
    let claims = decode(token)?;
    Some(TokenMetadata {
        issuer: claims
            .get("iss")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        audience: claims
            .get("aud")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        issued_at: claims.iat.map(secs_to_ms),
        expires_at: claims.exp.map(secs_to_ms),
    })
}

// =========================================================================
// Tests
// =========================================================================
