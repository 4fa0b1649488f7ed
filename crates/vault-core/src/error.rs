//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Vault is locked")]
    VaultLocked,

    /// Wrong master password or a record that fails authentication.
    /// Both cases report the same error.
    #[error("Invalid master password")]
    InvalidPassword,

    #[error("Invalid generator options: {0}")]
    InvalidOptions(String),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Decryption failed")]
    DecryptionError,

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Stored vault record is corrupt: {0}")]
    CorruptRecord(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

