//! AES-256-GCM authenticated encryption
//!
//! - IV: 12 bytes (96 bits), freshly random for every call
//! - Ciphertext: plaintext length + 16-byte auth tag appended by `aes-gcm`

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::DerivedKey;
use crate::error::{Result, VaultError};

/// IV length for GCM
pub const IV_LEN: usize = 12;

/// Output of one encryption: the IV it used and the tagged ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext under `key` with a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

    Ok(EncryptedData { iv, ciphertext })
}

/// Decrypt and authenticate `ciphertext`
///
/// A wrong key, a wrong IV, or any tampering all surface as the same
/// `DecryptionError` with no partial plaintext. The tag check inside
/// `aes-gcm` is constant time.
pub fn decrypt(ciphertext: &[u8], key: &DerivedKey, iv: &[u8; IV_LEN]) -> Result<Zeroizing<Vec<u8>>> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::DecryptionError)?;

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::DecryptionError)
}
