//! The stable set of vault keys used by the auth core.

use std::fmt;

/// Every key the auth core stores in the vault.
///
/// The string names are an **external contract**: real devices already
/// hold values under these names, so renaming one silently logs every
/// user out (or worse, strands orphaned secrets in the keystore).
/// New keys may be added; existing names must never change.
///
/// Using an enum instead of raw strings means a typo'd key is a compile
/// error, and the "clear everything on logout" path can enumerate the
/// session keys instead of hoping a list stayed in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultKey {
    /// The bearer access token.
    AccessToken,
    /// The refresh token.
    RefreshToken,
    /// The serialized user snapshot (JSON).
    UserSnapshot,
    /// Epoch-millisecond timestamp of when this session started.
    SessionStart,
    /// Epoch-millisecond timestamp of the last recorded user activity.
    LastActivity,
    /// "true" when biometric login is enabled.
    BiometricEnabled,
    /// The serialized biometric credential blob (JSON).
    BiometricCredentials,
    /// The resolved biometric type label ("facial", "fingerprint", ...).
    BiometricType,
}

impl VaultKey {
    /// The wire/storage name for this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "auth_access_token",
            Self::RefreshToken => "auth_refresh_token",
            Self::UserSnapshot => "auth_user",
            Self::SessionStart => "session_start_time",
            Self::LastActivity => "last_activity_time",
            Self::BiometricEnabled => "biometric_enabled",
            Self::BiometricCredentials => "biometric_credentials",
            Self::BiometricType => "biometric_type",
        }
    }

    /// The keys that make up an authenticated session. Logout clears
    /// exactly these; the biometric keys deliberately survive an
    /// ordinary logout so the user can skip password entry next time.
    pub fn session_keys() -> [VaultKey; 5] {
        [
            Self::AccessToken,
            Self::RefreshToken,
            Self::UserSnapshot,
            Self::SessionStart,
            Self::LastActivity,
        ]
    }

    /// The keys owned by the biometric feature, cleared on disable.
    pub fn biometric_keys() -> [VaultKey; 3] {
        [
            Self::BiometricEnabled,
            Self::BiometricCredentials,
            Self::BiometricType,
        ]
    }
}

impl fmt::Display for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_are_the_stable_contract() {
        // These names are persisted on real devices. If this test fails,
        // you are about to log every user out — don't.
        assert_eq!(VaultKey::AccessToken.as_str(), "auth_access_token");
        assert_eq!(VaultKey::RefreshToken.as_str(), "auth_refresh_token");
        assert_eq!(VaultKey::UserSnapshot.as_str(), "auth_user");
        assert_eq!(VaultKey::SessionStart.as_str(), "session_start_time");
        assert_eq!(VaultKey::LastActivity.as_str(), "last_activity_time");
        assert_eq!(VaultKey::BiometricEnabled.as_str(), "biometric_enabled");
        assert_eq!(
            VaultKey::BiometricCredentials.as_str(),
            "biometric_credentials"
        );
        assert_eq!(VaultKey::BiometricType.as_str(), "biometric_type");
    }

    #[test]
    fn test_session_keys_exclude_biometric_keys() {
        let session = VaultKey::session_keys();
        for key in VaultKey::biometric_keys() {
            assert!(
                !session.contains(&key),
                "{key} must survive an ordinary logout"
            );
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(VaultKey::UserSnapshot.to_string(), "auth_user");
    }
}
