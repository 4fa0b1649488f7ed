//! File storage backend
//!
//! Each key is one file in the data directory. Writes go to a temp file
//! that is synced and then renamed over the target.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::VaultBackend;
use crate::error::{Result, VaultError};

/// File-per-key storage backend
#[derive(Debug, Clone)]
pub struct FileBackend {
    storage_dir: PathBuf,
}

impl FileBackend {
    /// Create a backend in the platform data directory
    pub fn new() -> Result<Self> {
        Self::with_dir(Self::default_dir()?)
    }

    /// Create with a custom storage directory
    pub fn with_dir(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;

        debug!("File storage initialized at: {:?}", storage_dir);
        Ok(Self { storage_dir })
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("org", "secure-vault", "secure-vault")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| VaultError::StorageError("Could not determine data directory".to_string()))
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(VaultError::StorageError(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.storage_dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl VaultBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!("Read {} bytes for key {}", bytes.len(), key);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Key not found: {}", key);
                Ok(None)
            }
            Err(e) => Err(VaultError::StorageError(e.to_string())),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("tmp");

        let write = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(value).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(VaultError::StorageError(e.to_string()));
        }

        debug!("Stored {} bytes for key {}", value.len(), key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "File Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();

        backend.put("encryptedVault", b"blob").await.unwrap();

        assert_eq!(backend.get("encryptedVault").await.unwrap(), Some(b"blob".to_vec()));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();

        assert_eq!(backend.get("encryptedVault").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();

        backend.put("encryptedVault", b"first").await.unwrap();
        backend.put("encryptedVault", b"second").await.unwrap();

        assert_eq!(backend.get("encryptedVault").await.unwrap(), Some(b"second".to_vec()));
        assert!(!temp_dir.path().join("encryptedVault.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_put_keeps_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();
        backend.put("encryptedVault", b"intact").await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(temp_dir.path().join("encryptedVault.tmp")).unwrap();

        let result = backend.put("encryptedVault", b"replacement").await;
        assert!(matches!(result, Err(VaultError::StorageError(_))));
        assert_eq!(backend.get("encryptedVault").await.unwrap(), Some(b"intact".to_vec()));
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();
            backend.put("encryptedVault", b"persistent").await.unwrap();
        }

        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(backend.get("encryptedVault").await.unwrap(), Some(b"persistent".to_vec()));
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::with_dir(temp_dir.path().to_path_buf()).unwrap();

        assert!(backend.put("../escape", b"x").await.is_err());
        assert!(backend.get("").await.is_err());
    }
}
