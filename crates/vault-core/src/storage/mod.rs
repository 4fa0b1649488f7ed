//! Durable storage for the encrypted vault record
//!
//! `VaultBackend` is the opaque byte store; two backends ship:
//! 1. File storage (one file per key, atomic replace)
//! 2. In-memory storage
//!
//! `VaultStore` reads and writes the single `EncryptedRecord` through it.

mod file;
mod memory;
mod record;
mod traits;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use record::{EncryptedRecord, VaultStore, RECORD_KEY, STORE_VERSION};
pub use traits::VaultBackend;
