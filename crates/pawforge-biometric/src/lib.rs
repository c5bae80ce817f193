//! Biometric prompt gating and enrollment state for Pawforge.
//!
//! The platform's biometric machinery (Face ID, fingerprint readers,
//! iris scanners) lives behind the [`BiometricProvider`] trait; this
//! crate's [`BiometricGate`] adds the policy on top:
//!
//! 1. **Capability probing** that never throws — a broken platform API
//!    reads as "nothing available", because a capability question must
//!    not crash a login screen.
//! 2. **Gated prompting** — no OS prompt is ever shown when hardware or
//!    enrollment is missing; the user gets a descriptive refusal instead
//!    of a system dialog that cannot succeed.
//! 3. **Enablement state** persisted through the credential vault, so
//!    the rest of the auth core can ask "is biometric login on?" without
//!    touching platform APIs.
//!
//! What this crate does **not** do: talk to the network, or decide what
//! a successful prompt unlocks. That's the session manager's job.

mod error;
mod gate;
mod provider;

pub use error::BiometricError;
pub use gate::{AuthOutcome, BiometricGate};
pub use provider::{
    BiometricCapabilities, BiometricProvider, BiometricType, PromptOutcome,
    SecurityLevel,
};
