//! # vault-core
//!
//! Core functionality for Secure Vault:
//! - Argon2id key derivation and AES-256-GCM encryption
//! - Random password generation
//! - A single encrypted vault record over a pluggable byte store
//! - The Locked/Unlocked session with idle auto-lock

pub mod credential;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod session;
pub mod settings;
pub mod storage;

pub use credential::{Credential, NewCredential};
pub use crypto::{decrypt, derive_key, encrypt, generate_salt, DerivedKey, KeyDerivationParams};
pub use error::{Result, VaultError};
pub use generator::{generate, GeneratorOptions};
pub use session::{SessionConfig, VaultSession};
pub use settings::{Settings, SettingsManager};
pub use storage::{EncryptedRecord, FileBackend, MemoryBackend, VaultBackend, VaultStore};
