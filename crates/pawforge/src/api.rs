//! The backend API seam.
//!
//! The auth core never issues HTTP requests itself — it calls through
//! the [`AuthApi`] trait and lets the app supply the real client. That
//! keeps this workspace free of an HTTP stack (the host app already has
//! one) and lets every retry/backoff/persistence rule be tested against
//! a scripted mock.

use std::future::Future;

use crate::types::{
    AuthPayload, Credentials, RegisterData, ResetPasswordData, TokenPair,
};

/// Errors from the backend API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request reached the backend and was rejected.
    #[error("{message}")]
    Server {
        /// HTTP-ish status code as reported by the client.
        status: u16,
        /// Backend-provided message, shown to the user as-is.
        message: String,
    },

    /// The request never completed (offline, DNS, timeout).
    #[error("network request failed: {0}")]
    Network(String),
}

/// Everything the auth core asks of the backend.
///
/// Implementations own the wire format (URLs, header casing, field
/// name splitting) entirely; this trait deals in the crate's own types.
///
/// The `logout` call revokes the refresh token server-side. It is
/// best-effort from the core's perspective — local logout proceeds even
/// when revocation fails.
pub trait AuthApi: Send + Sync + 'static {
    /// Exchange email/password for a session.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthPayload, ApiError>> + Send;

    /// Create an account and log it in.
    fn register(
        &self,
        data: &RegisterData,
    ) -> impl Future<Output = Result<AuthPayload, ApiError>> + Send;

    /// Revoke a refresh token server-side.
    fn logout(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Exchange a refresh token for a fresh token pair. The backend
    /// rotates the refresh token; the old one is dead after this.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenPair, ApiError>> + Send;

    /// Exchange a stored biometric credential for a session.
    fn biometric_login(
        &self,
        email: &str,
        biometric_token: &str,
    ) -> impl Future<Output = Result<AuthPayload, ApiError>> + Send;

    /// Request a password-reset email.
    fn forgot_password(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Complete a password reset with the emailed token.
    fn reset_password(
        &self,
        data: &ResetPasswordData,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
