//! Data types shared across the auth core.
//!
//! Two serialization contracts meet here and must not be confused:
//!
//! - **Vault JSON** ([`UserSnapshot`], [`BiometricCredential`]) is
//!   persisted camelCase on real devices, so the serde shape is an
//!   external contract just like the vault key names.
//! - **Request/response types** ([`Credentials`], [`AuthPayload`], ...)
//!   only cross the [`AuthApi`](crate::AuthApi) seam as Rust values;
//!   the API client owns whatever wire shape the backend speaks.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Email/password login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// New account registration request.
///
/// `confirm_password` is checked locally before the request leaves the
/// device; the backend never sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Display name as one field; splitting into given/family names is
    /// a backend wire concern, not ours.
    pub name: String,
}

/// Password reset completion request (the emailed token plus the new
/// password).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordData {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

// ---------------------------------------------------------------------------
// User snapshot
// ---------------------------------------------------------------------------

/// The locally cached view of the signed-in user.
///
/// This is a *snapshot*: it reflects the last successful auth call or
/// profile update, not live backend state. Persisted as camelCase JSON
/// under the `auth_user` vault key — devices in the field already hold
/// that shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Onboarding finished (pet preferences filled in).
    #[serde(default)]
    pub profile_complete: bool,
    /// Paid subscription active.
    #[serde(default)]
    pub premium: bool,
}

/// A partial profile update: only the `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile_complete: Option<bool>,
    pub premium: Option<bool>,
}

impl UserUpdate {
    /// Applies the set fields onto a snapshot, leaving the rest alone.
    pub fn apply_to(&self, user: &mut UserSnapshot) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(profile_complete) = self.profile_complete {
            user.profile_complete = profile_complete;
        }
        if let Some(premium) = self.premium {
            user.premium = premium;
        }
    }
}

// ---------------------------------------------------------------------------
// API results
// ---------------------------------------------------------------------------

/// What a successful login/register/biometric-login returns: both
/// tokens plus the authoritative user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSnapshot,
}

/// What a token refresh returns. The backend rotates the refresh token
/// on every use, so both come back together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ---------------------------------------------------------------------------
// Session view
// ---------------------------------------------------------------------------

/// A restored session as handed to the app on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: UserSnapshot,
    /// Epoch-ms when this session was established (login or rotation).
    pub session_started_at: Option<u64>,
    /// Epoch-ms of the last recorded user activity.
    pub last_activity_at: Option<u64>,
}

// ---------------------------------------------------------------------------
// Biometric credential
// ---------------------------------------------------------------------------

/// The opaque credential exchanged for a session on biometric login.
///
/// The `biometric_token` is a device-local secret registered with the
/// backend when biometric login is enabled; passing a biometric prompt
/// unlocks it, never the user's password. Persisted as camelCase JSON
/// under the `biometric_credentials` vault key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricCredential {
    pub email: String,
    pub biometric_token: String,
}
