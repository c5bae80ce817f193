//! # Pawforge
//!
//! Authentication session and token lifecycle core for the
//! PawfectMatch app.
//!
//! The app implements three platform seams and hands them to one
//! [`AuthSessionManager`]:
//!
//! - [`AuthApi`] — the backend HTTP client;
//! - [`CredentialVault`] — encrypted device storage
//!   (re-exported from `pawforge-vault`);
//! - [`BiometricProvider`] — the OS biometric machinery
//!   (re-exported from `pawforge-biometric`).
//!
//! In return the manager owns the whole session state machine: login,
//! registration, logout, JWT inspection (`pawforge-claims`), serialized
//! token refresh with retry, explicit session extension, biometric
//! login, and the background watchdog (`pawforge-monitor`) that ends
//! sessions past the 24-hour cap or the 30-minute idle limit.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pawforge::{AuthSessionManager, Credentials};
//!
//! # async fn run(api: impl pawforge::AuthApi,
//! #              vault: impl pawforge::CredentialVault,
//! #              biometrics: impl pawforge::BiometricProvider) {
//! let auth = AuthSessionManager::new(api, vault, biometrics);
//!
//! // App startup: resume a persisted session if one is valid.
//! if let Some(session) = auth.restore().await {
//!     println!("welcome back, {}", session.user.name);
//! }
//!
//! // Or log in fresh.
//! let user = auth
//!     .login(&Credentials {
//!         email: "ana@example.com".into(),
//!         password: "hunter2!".into(),
//!     })
//!     .await
//!     .unwrap();
//! println!("hello, {}", user.name);
//! # }
//! ```
//!
//! ## Trust model
//!
//! Tokens are *decoded*, never *verified*, on the device — signature
//! checking is the backend's job. Everything `pawforge-claims` reads
//! out of a JWT is a scheduling hint (when to refresh), not an
//! authorization decision.

mod api;
mod error;
mod manager;
mod store;
mod types;

pub use api::{ApiError, AuthApi};
pub use error::AuthError;
pub use manager::AuthSessionManager;
pub use store::SessionStore;
pub use types::{
    AuthPayload, AuthSession, BiometricCredential, Credentials, RegisterData,
    ResetPasswordData, TokenPair, UserSnapshot, UserUpdate,
};

// Re-export the seam traits and supporting types so app code depends on
// this crate alone.
pub use pawforge_biometric::{
    AuthOutcome, BiometricCapabilities, BiometricError, BiometricGate,
    BiometricProvider, BiometricType, PromptOutcome, SecurityLevel,
};
pub use pawforge_claims::{
    Claims, DEFAULT_REFRESH_THRESHOLD_MS, TokenMetadata, TokenValidation,
};
pub use pawforge_monitor::{
    LogoutReason, MonitorConfig, SessionMonitor, SessionProbe,
};
pub use pawforge_vault::{CredentialVault, MemoryVault, VaultError, VaultKey};
