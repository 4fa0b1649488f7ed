//! The single encrypted vault record and its store
//!
//! On-disk format (JSON, byte fields hex encoded):
//! `{"version":1,"kdf":{...},"salt":"..","iv":"..","ciphertext":".."}`

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::VaultBackend;
use crate::crypto::{KeyDerivationParams, IV_LEN};
use crate::error::{Result, VaultError};

/// Fixed key the record is stored under
pub const RECORD_KEY: &str = "encryptedVault";

/// Store format version
pub const STORE_VERSION: u32 = 1;

/// Everything needed to re-derive the key and decrypt the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    /// Generated once at vault creation, reused for every derivation
    pub salt: Vec<u8>,
    /// Fresh for every encryption
    pub iv: [u8; IV_LEN],
    /// Serialized vault with the GCM tag appended
    pub ciphertext: Vec<u8>,
    /// KDF parameters the key was derived with
    pub kdf: KeyDerivationParams,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    version: u32,
    kdf: KeyDerivationParams,
    salt: String,
    iv: String,
    ciphertext: String,
}

impl EncryptedRecord {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let stored = StoredRecord {
            version: STORE_VERSION,
            kdf: self.kdf,
            salt: hex::encode(&self.salt),
            iv: hex::encode(self.iv),
            ciphertext: hex::encode(&self.ciphertext),
        };
        Ok(serde_json::to_vec(&stored)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let stored: StoredRecord = serde_json::from_slice(bytes)
            .map_err(|e| VaultError::CorruptRecord(format!("unreadable document: {}", e)))?;

        if stored.version != STORE_VERSION {
            return Err(VaultError::CorruptRecord(format!(
                "unsupported store version {}",
                stored.version
            )));
        }

        stored
            .kdf
            .validate()
            .map_err(|e| VaultError::CorruptRecord(format!("unusable KDF parameters: {}", e)))?;

        let salt = hex::decode(&stored.salt)
            .map_err(|e| VaultError::CorruptRecord(format!("invalid salt hex: {}", e)))?;
        if salt.is_empty() {
            return Err(VaultError::CorruptRecord("empty salt".to_string()));
        }

        let iv_bytes = hex::decode(&stored.iv)
            .map_err(|e| VaultError::CorruptRecord(format!("invalid IV hex: {}", e)))?;
        let iv: [u8; IV_LEN] = iv_bytes.as_slice().try_into().map_err(|_| {
            VaultError::CorruptRecord(format!(
                "invalid IV length: expected {}, got {}",
                IV_LEN,
                iv_bytes.len()
            ))
        })?;

        let ciphertext = hex::decode(&stored.ciphertext)
            .map_err(|e| VaultError::CorruptRecord(format!("invalid ciphertext hex: {}", e)))?;

        Ok(Self {
            salt,
            iv,
            ciphertext,
            kdf: stored.kdf,
        })
    }
}

/// Persistence for exactly one encrypted record
pub struct VaultStore {
    backend: Arc<dyn VaultBackend>,
}

impl VaultStore {
    pub fn new(backend: Arc<dyn VaultBackend>) -> Self {
        Self { backend }
    }

    /// Read the persisted record, if one has been written
    pub async fn load(&self) -> Result<Option<EncryptedRecord>> {
        match self.backend.get(RECORD_KEY).await? {
            Some(bytes) => {
                debug!("Loaded vault record from {}", self.backend.backend_name());
                EncryptedRecord::from_bytes(&bytes).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Replace the persisted record
    pub async fn save(&self, record: &EncryptedRecord) -> Result<()> {
        let bytes = record.to_bytes()?;
        self.backend.put(RECORD_KEY, &bytes).await?;
        debug!("Saved vault record to {}", self.backend.backend_name());
        Ok(())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileBackend, MemoryBackend};
    use tempfile::TempDir;

    fn sample_record() -> EncryptedRecord {
        EncryptedRecord {
            salt: vec![1u8; 16],
            iv: [2u8; IV_LEN],
            ciphertext: vec![3u8; 40],
            kdf: KeyDerivationParams::default(),
        }
    }

    #[tokio::test]
    async fn test_load_absent() {
        let store = VaultStore::new(Arc::new(MemoryBackend::new()));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_through_file_backend() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();
        let store = VaultStore::new(Arc::new(backend));

        store.save(&sample_record()).await.unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("encryptedVault.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["version"], 1);
        assert_eq!(doc["iv"], "020202020202020202020202");

        assert_eq!(store.load().await.unwrap(), Some(sample_record()));
    }

    #[tokio::test]
    async fn test_save_overwrites_single_record() {
        let store = VaultStore::new(Arc::new(MemoryBackend::new()));
        store.save(&sample_record()).await.unwrap();

        let mut second = sample_record();
        second.iv = [9u8; IV_LEN];
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await.unwrap().unwrap().iv, [9u8; IV_LEN]);
    }

    #[tokio::test]
    async fn test_corrupt_documents_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let store = VaultStore::new(backend.clone());

        let bad_documents: [&[u8]; 6] = [
            b"not json",
            br#"{"version":2,"kdf":{"memoryCost":1024,"timeCost":1,"parallelism":1},"salt":"01","iv":"020202020202020202020202","ciphertext":""}"#,
            br#"{"version":1,"kdf":{"memoryCost":1024,"timeCost":1,"parallelism":1},"salt":"01","iv":"0202","ciphertext":""}"#,
            br#"{"version":1,"kdf":{"memoryCost":1024,"timeCost":1,"parallelism":1},"salt":"zz","iv":"020202020202020202020202","ciphertext":""}"#,
            br#"{"version":1,"kdf":{"memoryCost":4294967295,"timeCost":1,"parallelism":1},"salt":"01","iv":"020202020202020202020202","ciphertext":""}"#,
            br#"{"version":1,"kdf":{"memoryCost":1024,"timeCost":0,"parallelism":1},"salt":"01","iv":"020202020202020202020202","ciphertext":""}"#,
        ];

        for doc in bad_documents {
            backend.put(RECORD_KEY, doc).await.unwrap();
            assert!(matches!(store.load().await, Err(VaultError::CorruptRecord(_))));
        }
    }

    #[tokio::test]
    async fn test_save_failure_reported() {
        let backend = Arc::new(MemoryBackend::new());
        let store = VaultStore::new(backend.clone());
        backend.set_fail_writes(true);

        let result = store.save(&sample_record()).await;
        assert!(matches!(result, Err(VaultError::StorageError(_))));
    }
}
