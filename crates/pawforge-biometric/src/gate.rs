//! The biometric gate: policy around the platform prompt.

use pawforge_vault::{CredentialVault, VaultKey};

use crate::provider::{
    BiometricCapabilities, BiometricProvider, BiometricType, SecurityLevel,
};

/// Default message shown on the OS prompt when the caller gives none.
const DEFAULT_PROMPT_MESSAGE: &str = "Authenticate to continue";

/// The result of a gated authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// The user passed the biometric check.
    pub success: bool,
    /// Why not, when `success` is false. Always present on failure, and
    /// descriptive enough for a log line — the UI layer decides what to
    /// actually show the user.
    pub error: Option<String>,
    /// Which biometric kind authenticated, by the facial > fingerprint
    /// > iris priority. Only set on success.
    pub biometric_type: Option<BiometricType>,
}

impl AuthOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            biometric_type: None,
        }
    }
}

/// Wraps a [`BiometricProvider`] with gating, capability collapse, and
/// vault-persisted enablement state.
///
/// One gate per auth core. It owns no mutable state of its own — the
/// enabled flag and resolved type label live in the vault so they
/// survive restarts, and capability questions always go to the
/// platform fresh (hardware can be enrolled/unenrolled between calls).
pub struct BiometricGate<P, V> {
    provider: P,
    vault: V,
}

impl<P, V> BiometricGate<P, V>
where
    P: BiometricProvider,
    V: CredentialVault,
{
    pub fn new(provider: P, vault: V) -> Self {
        Self { provider, vault }
    }

    /// Probes the device's biometric capabilities.
    ///
    /// Never fails: any platform error collapses the remaining fields
    /// to their "nothing available" values, with the platform's message
    /// preserved in `error`. A capability question must not be able to
    /// crash a login screen.
    pub async fn check_support(&self) -> BiometricCapabilities {
        let has_hardware = match self.provider.has_hardware().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "biometric hardware probe failed");
                return BiometricCapabilities::unavailable(Some(e.to_string()));
            }
        };
        if !has_hardware {
            return BiometricCapabilities::unavailable(None);
        }

        let mut caps = BiometricCapabilities {
            has_hardware: true,
            is_enrolled: false,
            supported_types: Vec::new(),
            security_level: SecurityLevel::None,
            error: None,
        };

        match self.provider.is_enrolled().await {
            Ok(v) => caps.is_enrolled = v,
            Err(e) => {
                tracing::warn!(error = %e, "biometric enrollment probe failed");
                caps.error = Some(e.to_string());
                return caps;
            }
        }

        match self.provider.supported_types().await {
            Ok(types) => caps.supported_types = types,
            Err(e) => {
                tracing::warn!(error = %e, "biometric type probe failed");
                caps.error = Some(e.to_string());
            }
        }

        match self.provider.security_level().await {
            Ok(level) => caps.security_level = level,
            Err(e) => {
                tracing::warn!(error = %e, "biometric security-level probe failed");
                caps.error.get_or_insert_with(|| e.to_string());
            }
        }

        caps
    }

    /// Runs a gated authentication prompt.
    ///
    /// Refuses immediately — without showing the OS prompt — when
    /// hardware or enrollment is missing; a dialog that cannot succeed
    /// is worse UX than a clear refusal.
    pub async fn authenticate(&self, reason: Option<&str>) -> AuthOutcome {
        let caps = self.check_support().await;
        if !caps.has_hardware {
            return AuthOutcome::failed("Biometric hardware not available");
        }
        if !caps.is_enrolled {
            return AuthOutcome::failed("No biometric credentials enrolled");
        }

        let message = reason.unwrap_or(DEFAULT_PROMPT_MESSAGE);
        match self.provider.prompt(message).await {
            Ok(outcome) if outcome.success => AuthOutcome {
                success: true,
                error: None,
                biometric_type: BiometricType::preferred(&caps.supported_types),
            },
            Ok(outcome) => AuthOutcome {
                success: false,
                error: Some(
                    outcome
                        .error
                        .unwrap_or_else(|| "Authentication failed".to_string()),
                ),
                biometric_type: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "biometric prompt errored");
                AuthOutcome::failed(e.to_string())
            }
        }
    }

    /// Enables biometric login for this device.
    ///
    /// Requires a **fresh** successful [`authenticate`](Self::authenticate)
    /// — never a prior success — then persists the enabled flag and the
    /// resolved type label. Returns `false` (not an error) when the
    /// prompt or the persistence fails: the caller is a settings toggle
    /// that simply stays off.
    pub async fn enable(&self) -> bool {
        let outcome = self
            .authenticate(Some("Authenticate to enable biometric login"))
            .await;
        if !outcome.success {
            tracing::warn!(
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "biometric enable refused: authentication failed"
            );
            return false;
        }

        if let Err(e) = self.vault.set(VaultKey::BiometricEnabled, "true").await {
            tracing::error!(error = %e, "failed to persist biometric enabled flag");
            return false;
        }
        let label = outcome
            .biometric_type
            .unwrap_or(BiometricType::Unknown)
            .label();
        if let Err(e) = self.vault.set(VaultKey::BiometricType, label).await {
            tracing::error!(error = %e, "failed to persist biometric type label");
            return false;
        }

        tracing::info!(biometric_type = label, "biometric login enabled");
        true
    }

    /// Disables biometric login. Best-effort: storage errors are logged
    /// and swallowed, never thrown — a failing keystore must not trap
    /// the user in the enabled state forever on the UI side.
    pub async fn disable(&self) {
        for key in [VaultKey::BiometricEnabled, VaultKey::BiometricType] {
            if let Err(e) = self.vault.delete(key).await {
                tracing::warn!(%key, error = %e, "biometric disable: delete failed");
            }
        }
        tracing::info!("biometric login disabled");
    }

    /// Whether biometric login is enabled. Read errors read as `false`.
    pub async fn is_enabled(&self) -> bool {
        match self.vault.get(VaultKey::BiometricEnabled).await {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "biometric enabled-flag read failed");
                false
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
