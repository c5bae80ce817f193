//! Unified error type for the auth core.

use pawforge_vault::VaultError;

use crate::api::ApiError;

/// Top-level error returned by [`AuthSessionManager`](crate::AuthSessionManager)
/// operations.
///
/// Display strings are user-facing: the UI layer shows them directly,
/// so backend messages pass through verbatim and the biometric fallback
/// message is fixed wording the product team owns.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A local pre-flight check failed; nothing left the device.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the request or was unreachable.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The credential vault failed during a commit (not during reads
    /// or best-effort cleanup, which are handled in place).
    #[error("secure storage failed: {0}")]
    Storage(#[from] VaultError),

    /// Biometric login was requested but the device can't do it
    /// (no hardware, nothing enrolled, or the feature is disabled).
    #[error("Biometric authentication is not available")]
    BiometricUnavailable,

    /// The biometric path failed after being attempted. The wording
    /// steers the user to the path that still works.
    #[error("Biometric login failed. Please use email and password.")]
    BiometricFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_pass_through_verbatim() {
        let err: AuthError = ApiError::Server {
            status: 401,
            message: "Invalid email or password".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_storage_error_wraps_vault_error() {
        let err: AuthError = VaultError::Write("keystore sealed".into()).into();
        assert!(err.to_string().contains("keystore sealed"));
        assert!(matches!(err, AuthError::Storage(_)));
    }

    #[test]
    fn test_biometric_failed_wording_is_fixed() {
        assert_eq!(
            AuthError::BiometricFailed.to_string(),
            "Biometric login failed. Please use email and password."
        );
    }
}
