//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file next to the
//! vault record. Settings are readable while the vault is locked.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::crypto::KeyDerivationParams;
use crate::error::Result;

/// Default idle time before the vault locks itself
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 15;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Auto-lock timeout in minutes (0 = never)
    pub auto_lock_timeout_minutes: u32,
    /// KDF parameters used when a new vault is created or re-keyed
    pub kdf: KeyDerivationParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            auto_lock_timeout_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            kdf: KeyDerivationParams::default(),
        }
    }
}

impl Settings {
    /// Idle duration before auto-lock, `None` when auto-lock is disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.auto_lock_timeout_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(u64::from(minutes) * 60)),
        }
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `storage_dir`, falling back to defaults
    pub fn new(storage_dir: &Path) -> Result<Self> {
        let settings_file = storage_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Whether the settings file has been written yet
    pub fn is_persisted(&self) -> bool {
        self.settings_file.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path()).unwrap();

        let settings = manager.get();
        assert_eq!(settings.auto_lock_timeout_minutes, 15);
        assert_eq!(settings.idle_timeout(), Some(Duration::from_secs(900)));
        assert_eq!(settings.kdf, KeyDerivationParams::default());
    }

    #[tokio::test]
    async fn test_defaults_written_once_saved() {
        let temp_dir = TempDir::new().unwrap();

        let manager = SettingsManager::new(temp_dir.path()).unwrap();
        assert!(!manager.is_persisted());
        manager.save().await.unwrap();
        assert!(manager.is_persisted());
        assert!(!temp_dir.path().join("settings.tmp").exists());

        let raw = std::fs::read_to_string(temp_dir.path().join("settings.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["autoLockTimeoutMinutes"], 15);
        assert_eq!(doc["kdf"]["memoryCost"], 65536);
    }

    #[test]
    fn test_settings_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"version":1,"autoLockTimeoutMinutes":30,"kdf":{"memoryCost":65536,"timeCost":5,"parallelism":4}}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path()).unwrap();
        assert!(manager.is_persisted());
        assert_eq!(manager.get().auto_lock_timeout_minutes, 30);
        assert_eq!(manager.get().kdf.time_cost, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("settings.json"),
            r#"{"autoLockTimeoutMinutes": 0}"#,
        )
        .unwrap();

        let manager = SettingsManager::new(temp_dir.path()).unwrap();
        assert_eq!(manager.get().idle_timeout(), None);
        assert_eq!(manager.get().kdf, KeyDerivationParams::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{ nope").unwrap();

        assert!(SettingsManager::new(temp_dir.path()).is_err());
    }
}
