//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Durable key-value byte store the vault record is written to
///
/// `put` must replace the previous value atomically: after a failed `put`
/// the prior value is still intact and readable.
#[async_trait]
pub trait VaultBackend: Send + Sync {
    /// Retrieve a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value under the given key, replacing any previous value
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
