//! Vault session: the Locked/Unlocked state machine
//!
//! The session is the only place the derived key and the plaintext
//! credentials exist. Every mutation (unlock, add, delete, lock, re-key)
//! holds the state write guard from start to finish, so two mutations can
//! never interleave and readers never observe a half-updated vault. The
//! auto-lock timer takes the same guard, which sequences it after any
//! in-flight mutation.

mod auto_lock;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use self::auto_lock::AutoLockTimer;
use crate::credential::{Credential, NewCredential};
use crate::crypto::{
    decrypt, derive_key, encrypt, generate_salt, DerivedKey, KeyDerivationParams, SALT_LEN,
};
use crate::error::{Result, VaultError};
use crate::settings::Settings;
use crate::storage::{EncryptedRecord, VaultBackend, VaultStore};

/// Session tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Idle time before the vault locks itself (`None` disables auto-lock)
    pub idle_timeout: Option<Duration>,
    /// KDF parameters for newly created or re-keyed vaults
    pub kdf: KeyDerivationParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for SessionConfig {
    fn from(settings: Settings) -> Self {
        Self {
            idle_timeout: settings.idle_timeout(),
            kdf: settings.kdf,
        }
    }
}

/// Key material and plaintext, present only while unlocked
struct UnlockedVault {
    key: DerivedKey,
    salt: Vec<u8>,
    kdf: KeyDerivationParams,
    credentials: Vec<Credential>,
}

enum SessionState {
    Locked,
    Unlocked(UnlockedVault),
}

impl SessionState {
    fn unlocked(&self) -> Result<&UnlockedVault> {
        match self {
            Self::Unlocked(vault) => Ok(vault),
            Self::Locked => Err(VaultError::VaultLocked),
        }
    }

    fn unlocked_mut(&mut self) -> Result<&mut UnlockedVault> {
        match self {
            Self::Unlocked(vault) => Ok(vault),
            Self::Locked => Err(VaultError::VaultLocked),
        }
    }

    fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked(_))
    }
}

struct Inner {
    state: RwLock<SessionState>,
    store: VaultStore,
    config: SessionConfig,
    timer: AutoLockTimer,
}

impl Inner {
    /// Encrypt `credentials` under `key` with a fresh IV and persist
    async fn persist(
        &self,
        credentials: &[Credential],
        key: &DerivedKey,
        salt: &[u8],
        kdf: KeyDerivationParams,
    ) -> Result<()> {
        let plaintext = Zeroizing::new(serde_json::to_vec(credentials)?);
        let encrypted = encrypt(&plaintext, key)?;

        let record = EncryptedRecord {
            salt: salt.to_vec(),
            iv: encrypted.iv,
            ciphertext: encrypted.ciphertext,
            kdf,
        };
        self.store.save(&record).await
    }

    /// Timer callback: lock unless the timer was replaced since it was armed
    async fn expire(&self, generation: u64) {
        let mut state = self.state.write().await;
        if !self.timer.is_current(generation) {
            debug!("Ignoring stale auto-lock timer");
            return;
        }
        if state.is_unlocked() {
            *state = SessionState::Locked;
            info!(
                "Vault auto-locked after {:?} idle",
                self.timer.idle_timeout().unwrap_or_default()
            );
        }
    }
}

/// Handle to one vault session; clones share the same session
#[derive(Clone)]
pub struct VaultSession {
    inner: Arc<Inner>,
}

impl VaultSession {
    /// Create a locked session over `store`
    pub fn new(store: VaultStore, config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::Locked),
                store,
                timer: AutoLockTimer::new(config.idle_timeout),
                config,
            }),
        }
    }

    /// Create a locked session writing through `backend`
    pub fn with_backend(backend: Arc<dyn VaultBackend>, config: SessionConfig) -> Self {
        Self::new(VaultStore::new(backend), config)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Check if the vault is unlocked
    pub async fn is_unlocked(&self) -> bool {
        self.inner.state.read().await.is_unlocked()
    }

    /// Unlock the stored vault, or create and unlock a new one if none exists
    ///
    /// Any failure leaves the session locked. A wrong password and a record
    /// that fails authentication or parsing both report `InvalidPassword`.
    pub async fn unlock_or_create(&self, password: &str) -> Result<()> {
        let mut state = self.inner.state.write().await;

        // Drop whatever key material was held before attempting anything.
        *state = SessionState::Locked;
        self.inner.timer.disarm();

        let unlocked = match self.inner.store.load().await {
            Ok(Some(record)) => self.open(record, password).await,
            Ok(None) => self.create(password).await,
            Err(VaultError::CorruptRecord(reason)) => {
                warn!("Stored vault record rejected: {}", reason);
                // Spend a derivation anyway so the reply time matches a wrong password.
                let salt = generate_salt(SALT_LEN);
                let _ = derive_key_blocking(password, &salt, self.inner.config.kdf).await;
                Err(VaultError::InvalidPassword)
            }
            Err(e) => Err(e),
        };

        match unlocked {
            Ok(vault) => {
                info!("Vault unlocked ({} credentials)", vault.credentials.len());
                *state = SessionState::Unlocked(vault);
                self.rearm();
                Ok(())
            }
            Err(e) => {
                warn!("Unlock failed: {}", e);
                Err(e)
            }
        }
    }

    async fn open(&self, record: EncryptedRecord, password: &str) -> Result<UnlockedVault> {
        let key = derive_key_blocking(password, &record.salt, record.kdf)
            .await
            .map_err(|e| match e {
                VaultError::KeyDerivationError(_) => VaultError::InvalidPassword,
                other => other,
            })?;

        let plaintext = decrypt(&record.ciphertext, &key, &record.iv)
            .map_err(|_| VaultError::InvalidPassword)?;
        let credentials: Vec<Credential> = serde_json::from_slice(&plaintext)
            .map_err(|_| VaultError::InvalidPassword)?;

        Ok(UnlockedVault {
            key,
            salt: record.salt,
            kdf: record.kdf,
            credentials,
        })
    }

    async fn create(&self, password: &str) -> Result<UnlockedVault> {
        let kdf = self.inner.config.kdf;
        kdf.check_strength()?;
        let salt = generate_salt(SALT_LEN);
        let key = derive_key_blocking(password, &salt, kdf).await?;

        let vault = UnlockedVault {
            key,
            salt,
            kdf,
            credentials: Vec::new(),
        };
        self.inner
            .persist(&vault.credentials, &vault.key, &vault.salt, vault.kdf)
            .await?;

        info!("Created new vault in {}", self.inner.store.backend_name());
        Ok(vault)
    }

    /// Discard the key and plaintext and return to Locked. Idempotent.
    pub async fn lock(&self) {
        let mut state = self.inner.state.write().await;
        self.inner.timer.disarm();

        if state.is_unlocked() {
            *state = SessionState::Locked;
            info!("Vault locked");
        }
    }

    /// Snapshot of all credentials in insertion order
    pub async fn list_credentials(&self) -> Result<Vec<Credential>> {
        let state = self.inner.state.read().await;
        let credentials = state.unlocked()?.credentials.clone();
        self.rearm();
        Ok(credentials)
    }

    /// Credentials whose site or username contains `query`, ignoring case
    pub async fn search_credentials(&self, query: &str) -> Result<Vec<Credential>> {
        let needle = query.trim().to_lowercase();
        let state = self.inner.state.read().await;

        let matches = state
            .unlocked()?
            .credentials
            .iter()
            .filter(|c| needle.is_empty() || c.matches(&needle))
            .cloned()
            .collect();
        self.rearm();
        Ok(matches)
    }

    /// Append a credential and persist; the append is undone if persisting fails
    pub async fn add_credential(&self, fields: NewCredential) -> Result<Credential> {
        let mut state = self.inner.state.write().await;
        let vault = state.unlocked_mut()?;

        let mut id = Uuid::new_v4();
        while vault.credentials.iter().any(|c| c.id == id) {
            id = Uuid::new_v4();
        }

        let credential = Credential::from_fields(id, fields);
        vault.credentials.push(credential.clone());

        if let Err(e) = self
            .inner
            .persist(&vault.credentials, &vault.key, &vault.salt, vault.kdf)
            .await
        {
            vault.credentials.retain(|c| c.id != id);
            error!("Failed to save new credential {}: {}", id, e);
            return Err(e);
        }

        self.rearm();
        info!("Added credential {}", id);
        Ok(credential)
    }

    /// Remove every credential with `id` and persist
    ///
    /// If persisting fails the removal stays in effect in memory and the
    /// error is returned; the stored vault still holds the credential until
    /// a later write succeeds or the vault is reopened.
    pub async fn delete_credential(&self, id: Uuid) -> Result<()> {
        let mut state = self.inner.state.write().await;
        let vault = state.unlocked_mut()?;

        let before = vault.credentials.len();
        vault.credentials.retain(|c| c.id != id);
        let removed = before - vault.credentials.len();

        if let Err(e) = self
            .inner
            .persist(&vault.credentials, &vault.key, &vault.salt, vault.kdf)
            .await
        {
            error!("Failed to save deletion of {}: {}", id, e);
            return Err(e);
        }

        self.rearm();
        info!("Deleted credential {} ({} removed)", id, removed);
        Ok(())
    }

    /// Re-key the vault under a new master password with a fresh salt
    ///
    /// `current` is checked by decrypting the stored record with a key
    /// derived from it. A wrong `current` reports `InvalidPassword` and
    /// leaves the session unlocked under the old key. If persisting fails
    /// the old key and salt stay in effect.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let mut state = self.inner.state.write().await;
        let vault = state.unlocked_mut()?;
        let kdf = self.inner.config.kdf;
        kdf.check_strength()?;

        let record = self
            .inner
            .store
            .load()
            .await
            .map_err(|e| match e {
                VaultError::CorruptRecord(_) => VaultError::InvalidPassword,
                other => other,
            })?
            .ok_or(VaultError::InvalidPassword)?;

        let check_key = derive_key_blocking(current, &vault.salt, vault.kdf).await?;
        decrypt(&record.ciphertext, &check_key, &record.iv)
            .map_err(|_| VaultError::InvalidPassword)?;

        let salt = generate_salt(SALT_LEN);
        let key = derive_key_blocking(new, &salt, kdf).await?;

        if let Err(e) = self.inner.persist(&vault.credentials, &key, &salt, kdf).await {
            error!("Failed to save re-keyed vault: {}", e);
            return Err(e);
        }

        vault.key = key;
        vault.salt = salt;
        vault.kdf = kdf;

        self.rearm();
        info!("Master password changed");
        Ok(())
    }

    /// Re-arm the auto-lock timer if the vault is unlocked
    pub async fn touch(&self) {
        if self.inner.state.read().await.is_unlocked() {
            self.rearm();
        }
    }

    fn rearm(&self) {
        let session = Arc::downgrade(&self.inner);
        self.inner.timer.arm(move |generation| async move {
            if let Some(inner) = session.upgrade() {
                inner.expire(generation).await;
            }
        });
    }
}

/// Run the KDF on the blocking pool
async fn derive_key_blocking(
    password: &str,
    salt: &[u8],
    params: KeyDerivationParams,
) -> Result<DerivedKey> {
    let password = Zeroizing::new(password.as_bytes().to_vec());
    let salt = salt.to_vec();

    tokio::task::spawn_blocking(move || derive_key(&password, &salt, &params))
        .await
        .map_err(|e| VaultError::Internal(format!("key derivation task failed: {}", e)))?
}
