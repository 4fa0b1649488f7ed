//! Cryptographic primitives for the vault envelope
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with a fresh 96-bit IV per call
//! - Argon2id key derivation from the master password
//! - A zeroize-on-drop derived key type

mod encryption;
mod key;
mod key_derivation;

pub use encryption::{decrypt, encrypt, EncryptedData, IV_LEN};
pub use key::DerivedKey;
pub use key_derivation::{derive_key, generate_salt, KeyDerivationParams, SALT_LEN};
