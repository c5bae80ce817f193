//! The platform biometric provider contract and capability types.

use std::future::Future;

use crate::BiometricError;

// ---------------------------------------------------------------------------
// BiometricType
// ---------------------------------------------------------------------------

/// A kind of biometric authentication the device can perform.
///
/// When a device supports several, the gate picks one to report using a
/// fixed priority: **facial > fingerprint > iris > unknown**. The label
/// is stored in the vault (under `biometric_type`) so the UI can say
/// "Sign in with Face ID" without re-probing hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiometricType {
    /// Face recognition (Face ID and friends).
    Facial,
    /// Fingerprint readers.
    Fingerprint,
    /// Iris scanners.
    Iris,
    /// The platform reported a type this crate doesn't know.
    Unknown,
}

impl BiometricType {
    /// The stable storage/display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Facial => "facial",
            Self::Fingerprint => "fingerprint",
            Self::Iris => "iris",
            Self::Unknown => "unknown",
        }
    }

    /// Ranking for prompt reporting — lower is preferred.
    fn priority(self) -> u8 {
        match self {
            Self::Facial => 0,
            Self::Fingerprint => 1,
            Self::Iris => 2,
            Self::Unknown => 3,
        }
    }

    /// Picks the preferred type from a supported-type list.
    /// Empty list ⇒ `None` (the caller shouldn't be prompting at all).
    pub fn preferred(types: &[BiometricType]) -> Option<BiometricType> {
        types.iter().copied().min_by_key(|t| t.priority())
    }
}

impl std::fmt::Display for BiometricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SecurityLevel
// ---------------------------------------------------------------------------

/// How strongly the device protects its enrolled credential.
///
/// Mirrors the platform's enrolled-level probe: no credential at all, a
/// non-biometric secret (PIN/pattern), or a real biometric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// Nothing enrolled.
    #[default]
    None,
    /// Device secret (PIN, pattern, password).
    Secret,
    /// Biometric credential.
    Biometric,
}

// ---------------------------------------------------------------------------
// Capability snapshot
// ---------------------------------------------------------------------------

/// The result of probing the device's biometric capabilities.
///
/// Constructed by [`BiometricGate::check_support`](crate::BiometricGate::check_support);
/// never by platform code directly. When a probe fails partway, the
/// fields settle at their "nothing available" values and `error` holds
/// the platform's message for logging/diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BiometricCapabilities {
    /// The device has a biometric sensor.
    pub has_hardware: bool,
    /// The user has enrolled at least one biometric credential.
    pub is_enrolled: bool,
    /// Which kinds of biometrics the device supports.
    pub supported_types: Vec<BiometricType>,
    /// How strongly the enrolled credential is protected.
    pub security_level: SecurityLevel,
    /// Platform error text when a probe failed (capability collapse).
    pub error: Option<String>,
}

impl BiometricCapabilities {
    /// Biometric login is possible: hardware present *and* enrolled.
    pub fn available(&self) -> bool {
        self.has_hardware && self.is_enrolled
    }

    /// The "nothing available" set, with an optional failure reason.
    pub fn unavailable(error: Option<String>) -> Self {
        Self {
            has_hardware: false,
            is_enrolled: false,
            supported_types: Vec::new(),
            security_level: SecurityLevel::None,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt outcome
// ---------------------------------------------------------------------------

/// What the OS prompt reported back.
///
/// A user cancelling or failing the scan is a *successful call* with
/// `success == false` — only a broken platform API is a
/// [`BiometricError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOutcome {
    /// The user passed the biometric check.
    pub success: bool,
    /// Platform failure label when `success` is false
    /// ("UserCancel", "SystemCancel", "Authentication failed", ...).
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// The platform's biometric machinery.
///
/// Implemented once per platform (and once as a mock in tests). Each
/// method maps to a single platform call; policy — gating, collapsing,
/// priority — lives in [`BiometricGate`](crate::BiometricGate), so
/// providers stay thin and dumb.
///
/// The OS prompt is not cancellable from application code; `prompt`
/// resolves only when the user or the system dismisses it.
pub trait BiometricProvider: Send + Sync + 'static {
    /// Does the device have a biometric sensor?
    fn has_hardware(&self)
        -> impl Future<Output = Result<bool, BiometricError>> + Send;

    /// Has the user enrolled a biometric credential?
    fn is_enrolled(&self)
        -> impl Future<Output = Result<bool, BiometricError>> + Send;

    /// Which biometric types does the device support?
    fn supported_types(
        &self,
    ) -> impl Future<Output = Result<Vec<BiometricType>, BiometricError>> + Send;

    /// How strongly is the enrolled credential protected?
    fn security_level(
        &self,
    ) -> impl Future<Output = Result<SecurityLevel, BiometricError>> + Send;

    /// Shows the OS authentication prompt with the given message.
    fn prompt(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<PromptOutcome, BiometricError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_type_follows_priority_order() {
        use BiometricType::*;
        assert_eq!(BiometricType::preferred(&[Fingerprint, Facial]), Some(Facial));
        assert_eq!(BiometricType::preferred(&[Iris, Fingerprint]), Some(Fingerprint));
        assert_eq!(BiometricType::preferred(&[Unknown, Iris]), Some(Iris));
        assert_eq!(BiometricType::preferred(&[Unknown]), Some(Unknown));
        assert_eq!(BiometricType::preferred(&[]), None);
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(BiometricType::Facial.label(), "facial");
        assert_eq!(BiometricType::Fingerprint.label(), "fingerprint");
        assert_eq!(BiometricType::Iris.label(), "iris");
        assert_eq!(BiometricType::Unknown.label(), "unknown");
    }

    #[test]
    fn test_unavailable_capabilities_are_all_off() {
        let caps = BiometricCapabilities::unavailable(Some("boom".into()));
        assert!(!caps.available());
        assert!(!caps.has_hardware);
        assert!(!caps.is_enrolled);
        assert!(caps.supported_types.is_empty());
        assert_eq!(caps.security_level, SecurityLevel::None);
        assert_eq!(caps.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_available_requires_hardware_and_enrollment() {
        let mut caps = BiometricCapabilities::unavailable(None);
        caps.has_hardware = true;
        assert!(!caps.available(), "hardware alone is not enough");

        caps.is_enrolled = true;
        assert!(caps.available());
    }
}
