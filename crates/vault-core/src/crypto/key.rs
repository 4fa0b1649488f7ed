//! Derived key held in memory only while the vault is unlocked

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the derived symmetric key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Symmetric key produced by the KDF - zeroed when dropped, never serialized
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub(crate) fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Raw key bytes, for handing to the cipher
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacted() {
        let key = DerivedKey::new([0x5a; KEY_LEN]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("90"));
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut key = DerivedKey::new([7u8; KEY_LEN]);
        key.zeroize();
        assert_eq!(key.as_bytes(), &[0u8; KEY_LEN]);
    }
}
