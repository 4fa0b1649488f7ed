//! Password-based key derivation using Argon2id

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::key::{DerivedKey, KEY_LEN};
use crate::error::{Result, VaultError};

/// Default salt length in bytes
pub const SALT_LEN: usize = 16;

/// Floor for new vaults: 19 MiB, 2 passes
pub const MIN_MEMORY_COST: u32 = 19 * 1024;
pub const MIN_TIME_COST: u32 = 2;

/// Caps on anything we will run, stored records included
pub const MAX_MEMORY_COST: u32 = 1024 * 1024;
pub const MAX_TIME_COST: u32 = 64;
pub const MAX_PARALLELISM: u32 = 16;

/// Parameters for Argon2id key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64MB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 3)
    pub time_cost: u32,
    /// Parallelism (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Cheapest parameters accepted for a new vault (OWASP Argon2id baseline)
    pub const MINIMUM: Self = Self {
        memory_cost: MIN_MEMORY_COST,
        time_cost: MIN_TIME_COST,
        parallelism: 1,
    };

    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))
    }

    /// Reject parameters Argon2 would refuse or that exceed the resource caps
    ///
    /// Applies to any params about to be run, including ones read back from
    /// a stored record.
    pub fn validate(&self) -> Result<()> {
        if self.memory_cost > MAX_MEMORY_COST {
            return Err(VaultError::KeyDerivationError(format!(
                "memory cost {} KiB exceeds {} KiB",
                self.memory_cost, MAX_MEMORY_COST
            )));
        }
        if self.time_cost > MAX_TIME_COST {
            return Err(VaultError::KeyDerivationError(format!(
                "time cost {} exceeds {}",
                self.time_cost, MAX_TIME_COST
            )));
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(VaultError::KeyDerivationError(format!(
                "parallelism {} exceeds {}",
                self.parallelism, MAX_PARALLELISM
            )));
        }
        self.to_argon2().map(|_| ())
    }

    /// [`validate`](Self::validate) plus the minimum cost for writing a new vault
    pub fn check_strength(&self) -> Result<()> {
        self.validate()?;

        if self.memory_cost < MIN_MEMORY_COST || self.time_cost < MIN_TIME_COST {
            return Err(VaultError::KeyDerivationError(format!(
                "parameters below minimum cost ({} KiB, {} passes)",
                MIN_MEMORY_COST, MIN_TIME_COST
            )));
        }
        Ok(())
    }
}

/// Generate `size` bytes of salt from the OS CSPRNG
pub fn generate_salt(size: usize) -> Vec<u8> {
    let mut salt = vec![0u8; size];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive a 256-bit key from a password and salt using Argon2id
///
/// The same password, salt and params always yield the same key. This is
/// intentionally slow; async callers should run it on the blocking pool.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KeyDerivationParams,
) -> Result<DerivedKey> {
    params.validate()?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut key_bytes = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key_bytes)
        .map_err(|e| VaultError::KeyDerivationError(e.to_string()))?;

    let key = DerivedKey::new(key_bytes);
    zeroize::Zeroize::zeroize(&mut key_bytes);
    Ok(key)
}
