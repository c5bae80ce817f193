//! Bearer token claims decoding and expiry math for Pawforge.
//!
//! This crate is the pure, synchronous leaf of the auth stack: it turns
//! a compact three-part bearer token into a [`Claims`] object and answers
//! timing questions about it (expired? expiring soon? refresh due?).
//! No I/O, no state, nothing here can block or fail loudly — every
//! malformed input degrades to `None`/`false` rather than an error.
//!
//! # Trust model
//!
//! The signature segment is deliberately **never verified**. The client
//! trusts the issuer and only inspects claims for UX timing decisions
//! (when to refresh, when to show a re-login prompt). Authorization is
//! the server's job; a forged `exp` claim only lets a client mis-time
//! its own refreshes. Adding client-side verification would change
//! observable behavior for malformed-but-accepted tokens, so don't.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Manager (above)  ← decides when to refresh/logout
//!     ↕
//! Claims Layer (this crate)  ← decodes tokens, computes expiry windows
//! ```

mod codec;
mod types;

pub use codec::{
    decode, expires_at, expires_in, expires_in_at, is_expired,
    is_expired_at, metadata, should_refresh, should_refresh_within,
    user_id, validate, validate_at,
};
pub use types::{Claims, TokenMetadata, TokenValidation, DEFAULT_REFRESH_THRESHOLD_MS};
