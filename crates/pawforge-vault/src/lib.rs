//! Encrypted credential storage contract for Pawforge.
//!
//! The auth core never talks to a platform keystore directly — it goes
//! through the [`CredentialVault`] trait: async string get/set/delete
//! under a small, stable set of [`VaultKey`]s. The platform app supplies
//! the real implementation (keychain, keystore, secure enclave wrapper);
//! this crate supplies the contract plus [`MemoryVault`] for tests and
//! development.
//!
//! # Why a trait?
//!
//! Same reasoning as any seam in this workspace: the session manager
//! needs "durable encrypted strings", not a specific vendor SDK. With a
//! trait we can run the full auth state machine against an in-memory
//! map in tests, and against the device keystore in production, without
//! the manager knowing the difference.
//!
//! # Failure contract
//!
//! Every operation can fail (storage I/O). Consumers follow one rule:
//! **reads that fail are treated as "value absent"**, and **writes that
//! fail during a commit are surfaced** while writes/deletes during
//! best-effort cleanup are logged and swallowed. That policy lives in
//! the callers, not here — the vault just reports what happened.

mod error;
mod keys;
mod memory;

pub use error::VaultError;
pub use keys::VaultKey;
pub use memory::MemoryVault;

use std::future::Future;
use std::sync::Arc;

/// Durable, encrypted key/value storage for session material.
///
/// # Trait bounds
///
/// - `Send + Sync` → shared across Tokio tasks (the session monitor
///   reads timestamps from another task than the manager writes them).
/// - `'static` → owns its data; lives as long as the auth core.
///
/// Methods return `impl Future + Send` (rather than plain `async fn`)
/// so generic callers can spawn futures that use the vault.
pub trait CredentialVault: Send + Sync + 'static {
    /// Reads the value stored under `key`, `Ok(None)` if absent.
    fn get(
        &self,
        key: VaultKey,
    ) -> impl Future<Output = Result<Option<String>, VaultError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: VaultKey,
        value: &str,
    ) -> impl Future<Output = Result<(), VaultError>> + Send;

    /// Removes the value under `key`. Deleting an absent key is OK.
    fn delete(
        &self,
        key: VaultKey,
    ) -> impl Future<Output = Result<(), VaultError>> + Send;
}

/// A shared vault is still a vault. This lets the manager hold an
/// `Arc<V>` (so the monitor task can hold a clone) without every
/// signature spelling that out.
impl<V: CredentialVault> CredentialVault for Arc<V> {
    fn get(
        &self,
        key: VaultKey,
    ) -> impl Future<Output = Result<Option<String>, VaultError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: VaultKey,
        value: &str,
    ) -> impl Future<Output = Result<(), VaultError>> + Send {
        (**self).set(key, value)
    }

    fn delete(
        &self,
        key: VaultKey,
    ) -> impl Future<Output = Result<(), VaultError>> + Send {
        (**self).delete(key)
    }
}
