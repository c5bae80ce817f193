//! Error type for platform biometric calls.

/// Errors reported by a [`BiometricProvider`](crate::BiometricProvider).
///
/// These never escape the gate: capability failures collapse to
/// "unavailable" and prompt failures collapse to an unsuccessful
/// [`AuthOutcome`](crate::AuthOutcome). The type exists so provider
/// implementations have something honest to return, and so the gate can
/// log *what* the platform said before swallowing it.
#[derive(Debug, thiserror::Error)]
pub enum BiometricError {
    /// A capability query (hardware, enrollment, types) failed.
    #[error("biometric capability query failed: {0}")]
    Capability(String),

    /// The OS authentication prompt itself errored (distinct from the
    /// user failing or cancelling it, which is a normal outcome).
    #[error("biometric prompt failed: {0}")]
    Prompt(String),
}
