//! In-memory vault implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{CredentialVault, VaultError, VaultKey};

/// A [`CredentialVault`] backed by a plain `HashMap`.
///
/// Nothing here is encrypted or durable — this exists for tests and
/// local development, the same way the protocol layer would ship a
/// debug codec. The map sits behind a `std::sync::Mutex` (not Tokio's):
/// no `.await` ever happens while the lock is held, so a synchronous
/// mutex is correct and cheaper.
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<VaultKey, String>>,
}

impl MemoryVault {
    /// Creates an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("vault mutex poisoned").len()
    }

    /// Test helper: `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialVault for MemoryVault {
    async fn get(&self, key: VaultKey) -> Result<Option<String>, VaultError> {
        let entries = self.entries.lock().expect("vault mutex poisoned");
        Ok(entries.get(&key).cloned())
    }

    async fn set(&self, key: VaultKey, value: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.lock().expect("vault mutex poisoned");
        entries.insert(key, value.to_string());
        Ok(())
    }

    async fn delete(&self, key: VaultKey) -> Result<(), VaultError> {
        let mut entries = self.entries.lock().expect("vault mutex poisoned");
        entries.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_absent_key_returns_none() {
        let vault = MemoryVault::new();
        let value = vault.get(VaultKey::AccessToken).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let vault = MemoryVault::new();
        vault.set(VaultKey::AccessToken, "tok-1").await.unwrap();

        let value = vault.get(VaultKey::AccessToken).await.unwrap();
        assert_eq!(value.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let vault = MemoryVault::new();
        vault.set(VaultKey::RefreshToken, "old").await.unwrap();
        vault.set(VaultKey::RefreshToken, "new").await.unwrap();

        let value = vault.get(VaultKey::RefreshToken).await.unwrap();
        assert_eq!(value.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_delete_removes_value() {
        let vault = MemoryVault::new();
        vault.set(VaultKey::UserSnapshot, "{}").await.unwrap();
        vault.delete(VaultKey::UserSnapshot).await.unwrap();

        assert_eq!(vault.get(VaultKey::UserSnapshot).await.unwrap(), None);
        assert!(vault.is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let vault = MemoryVault::new();
        vault.delete(VaultKey::SessionStart).await.unwrap();
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let vault = MemoryVault::new();
        vault.set(VaultKey::AccessToken, "a").await.unwrap();
        vault.set(VaultKey::RefreshToken, "r").await.unwrap();
        vault.delete(VaultKey::AccessToken).await.unwrap();

        assert_eq!(vault.get(VaultKey::AccessToken).await.unwrap(), None);
        assert_eq!(
            vault.get(VaultKey::RefreshToken).await.unwrap().as_deref(),
            Some("r")
        );
    }
}
