//! Error type for vault operations.

/// Errors reported by a [`CredentialVault`](crate::CredentialVault)
/// implementation.
///
/// The variant tells callers which operation failed; the payload is the
/// backend's own message (keychain error codes, I/O text, etc.). The
/// auth core never branches on the message — only on read vs. write —
/// so backends are free to put anything useful in it.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// A read failed. Consumers treat this the same as "absent".
    #[error("vault read failed: {0}")]
    Read(String),

    /// A write failed. Fatal during a session commit, logged during
    /// best-effort updates.
    #[error("vault write failed: {0}")]
    Write(String),

    /// A delete failed. Only ever best-effort — cleanup continues.
    #[error("vault delete failed: {0}")]
    Delete(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_operation() {
        assert_eq!(
            VaultError::Read("keychain locked".into()).to_string(),
            "vault read failed: keychain locked"
        );
        assert_eq!(
            VaultError::Write("disk full".into()).to_string(),
            "vault write failed: disk full"
        );
        assert_eq!(
            VaultError::Delete("gone".into()).to_string(),
            "vault delete failed: gone"
        );
    }
}
