//! In-process storage backend, used for embedding and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::VaultBackend;
use crate::error::{Result, VaultError};

/// Map-backed storage that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with a storage error until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl VaultBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(VaultError::StorageError("write rejected".to_string()));
        }

        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());

        debug!("Stored {} bytes for key {}", value.len(), key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Memory Storage"
    }
}
