//! Vault-backed session state.
//!
//! `SessionStore` is the only place that touches session material in
//! the vault; the manager above it deals in typed values. The store
//! enforces the failure policy from the vault contract:
//!
//! - **reads that fail are "value absent"** — a flaky keystore looks
//!   like being logged out, never like a crash;
//! - **writes during a commit are surfaced**, and a partial commit is
//!   rolled back to "no session" so the vault can't hold an access
//!   token without its user (or vice versa);
//! - **cleanup deletes are best-effort** — logout always succeeds
//!   locally.

use pawforge_vault::{CredentialVault, VaultError, VaultKey};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::error::AuthError;
use crate::types::{AuthPayload, BiometricCredential, TokenPair, UserSnapshot};

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Typed access to the session keys in the vault.
pub struct SessionStore<V> {
    vault: V,
}

impl<V: CredentialVault> SessionStore<V> {
    pub fn new(vault: V) -> Self {
        Self { vault }
    }

    // -- Commits ----------------------------------------------------------

    /// Persists a full session after login/register/biometric login.
    /// Always restarts the 24-hour session window: every caller is a
    /// fresh authentication, and re-used sessions go through
    /// [`persist_tokens`](Self::persist_tokens) instead.
    ///
    /// On a partial write failure the session keys are cleared and the
    /// error surfaced: half a session is worse than none.
    pub async fn persist_session(&self, payload: &AuthPayload) -> Result<(), AuthError> {
        let result = self.write_session(payload).await;
        if result.is_err() {
            self.clear_session().await;
        }
        result.map_err(AuthError::from)
    }

    async fn write_session(&self, payload: &AuthPayload) -> Result<(), VaultError> {
        let user_json = serde_json::to_string(&payload.user)
            .map_err(|e| VaultError::Write(format!("user snapshot encode: {e}")))?;

        self.vault
            .set(VaultKey::AccessToken, &payload.access_token)
            .await?;
        self.vault
            .set(VaultKey::RefreshToken, &payload.refresh_token)
            .await?;
        self.vault.set(VaultKey::UserSnapshot, &user_json).await?;

        let now = now_ms().to_string();
        self.vault.set(VaultKey::SessionStart, &now).await?;
        self.vault.set(VaultKey::LastActivity, &now).await?;
        Ok(())
    }

    /// Persists a refreshed token pair.
    ///
    /// Deliberately leaves `session_start_time` alone: a background
    /// refresh keeps the session usable but must not extend the
    /// 24-hour window. Only [`reset_session_window`](Self::reset_session_window)
    /// does that.
    pub async fn persist_tokens(&self, tokens: &TokenPair) -> Result<(), AuthError> {
        let result: Result<(), VaultError> = async {
            self.vault
                .set(VaultKey::AccessToken, &tokens.access_token)
                .await?;
            self.vault
                .set(VaultKey::RefreshToken, &tokens.refresh_token)
                .await?;
            self.vault
                .set(VaultKey::LastActivity, &now_ms().to_string())
                .await
        }
        .await;

        if result.is_err() {
            self.clear_session().await;
        }
        result.map_err(AuthError::from)
    }

    /// Restarts the 24-hour session window at "now". Called only on
    /// explicit session extension (token rotation).
    pub async fn reset_session_window(&self) -> Result<(), AuthError> {
        let now = now_ms().to_string();
        self.vault.set(VaultKey::SessionStart, &now).await?;
        self.vault.set(VaultKey::LastActivity, &now).await?;
        Ok(())
    }

    /// Removes every session key. Best-effort: a failing delete is
    /// logged and skipped so logout can't get stuck. Biometric keys
    /// survive — they belong to the device, not the session.
    pub async fn clear_session(&self) {
        for key in VaultKey::session_keys() {
            if let Err(e) = self.vault.delete(key).await {
                warn!(%key, error = %e, "session cleanup: delete failed");
            }
        }
    }

    // -- Reads (absent on failure) ----------------------------------------

    pub async fn access_token(&self) -> Option<String> {
        self.read_opt(VaultKey::AccessToken).await
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.read_opt(VaultKey::RefreshToken).await
    }

    /// The cached user snapshot. A corrupt or unreadable snapshot reads
    /// as absent (and is logged) rather than erroring.
    pub async fn user(&self) -> Option<UserSnapshot> {
        let json = self.read_opt(VaultKey::UserSnapshot).await?;
        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user snapshot is corrupt");
                None
            }
        }
    }

    async fn read_opt(&self, key: VaultKey) -> Option<String> {
        match self.vault.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "vault read failed, treating as absent");
                None
            }
        }
    }

    /// Authenticated means both an access token and a user snapshot are
    /// present — partial state reads as logged out. The token may be
    /// expired; expiry is the refresh path's problem, not presence's.
    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some() && self.user().await.is_some()
    }

    /// [`is_authenticated`](Self::is_authenticated) with vault errors
    /// surfaced instead of read as "logged out". The watchdog needs the
    /// distinction: a transient keystore failure must skip its tick,
    /// not terminate it while the session keys still exist.
    pub async fn session_present(&self) -> Result<bool, VaultError> {
        Ok(self.vault.get(VaultKey::AccessToken).await?.is_some()
            && self.vault.get(VaultKey::UserSnapshot).await?.is_some())
    }

    // -- User snapshot updates --------------------------------------------

    pub async fn save_user(&self, user: &UserSnapshot) -> Result<(), AuthError> {
        let json = serde_json::to_string(user)
            .map_err(|e| VaultError::Write(format!("user snapshot encode: {e}")))?;
        self.vault.set(VaultKey::UserSnapshot, &json).await?;
        Ok(())
    }

    // -- Timestamps --------------------------------------------------------

    /// These surface vault errors (unlike the token reads) because the
    /// session monitor needs to distinguish "not recorded" from "could
    /// not read" — the latter must skip the check, not pass it.
    pub async fn session_started_at(&self) -> Result<Option<u64>, VaultError> {
        self.read_timestamp(VaultKey::SessionStart).await
    }

    pub async fn last_activity_at(&self) -> Result<Option<u64>, VaultError> {
        self.read_timestamp(VaultKey::LastActivity).await
    }

    async fn read_timestamp(&self, key: VaultKey) -> Result<Option<u64>, VaultError> {
        let Some(raw) = self.vault.get(key).await? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(ts) => Ok(Some(ts)),
            Err(_) => {
                warn!(%key, raw, "stored timestamp is not a number");
                Ok(None)
            }
        }
    }

    /// Records user activity at "now".
    pub async fn touch_activity(&self) -> Result<(), VaultError> {
        self.vault
            .set(VaultKey::LastActivity, &now_ms().to_string())
            .await
    }

    // -- Biometric credential ---------------------------------------------

    pub async fn biometric_credential(&self) -> Option<BiometricCredential> {
        let json = self.read_opt(VaultKey::BiometricCredentials).await?;
        match serde_json::from_str(&json) {
            Ok(cred) => Some(cred),
            Err(e) => {
                warn!(error = %e, "stored biometric credential is corrupt");
                None
            }
        }
    }

    pub async fn save_biometric_credential(
        &self,
        cred: &BiometricCredential,
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(cred)
            .map_err(|e| VaultError::Write(format!("biometric credential encode: {e}")))?;
        self.vault.set(VaultKey::BiometricCredentials, &json).await?;
        Ok(())
    }

    /// Removes the stored biometric credential blob. Best-effort.
    pub async fn clear_biometric_credential(&self) {
        if let Err(e) = self.vault.delete(VaultKey::BiometricCredentials).await {
            warn!(error = %e, "biometric credential delete failed");
        }
    }
}
