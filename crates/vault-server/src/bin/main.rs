//! Secure Vault CLI - serves the vault protocol over stdio
//!
//! Requests are read from stdin one JSON document per line; responses are
//! written to stdout the same way. Logs go to stderr.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use vault_core::{FileBackend, SessionConfig, SettingsManager, VaultSession};
use vault_server::{RequestRouter, StdioTransport};

/// Secure Vault - local password vault with auto-lock
#[derive(Parser, Debug)]
#[command(name = "secure-vault")]
#[command(version)]
#[command(about = "Secure Vault - encrypted local credential store over a stdio protocol")]
struct Args {
    /// Directory holding the vault record and settings
    #[arg(long, env = "SECURE_VAULT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Minutes of inactivity before the vault locks itself (0 disables)
    #[arg(long, env = "SECURE_VAULT_IDLE_TIMEOUT_MINUTES")]
    idle_timeout_minutes: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => FileBackend::default_dir().map_err(|e| format!("Failed to resolve data directory: {}", e))?,
    };

    let backend = FileBackend::with_dir(data_dir.clone())
        .map_err(|e| format!("Failed to initialize storage: {}", e))?;

    let settings_manager = SettingsManager::new(&data_dir)
        .map_err(|e| format!("Failed to load settings: {}", e))?;
    if !settings_manager.is_persisted() {
        settings_manager
            .save()
            .await
            .map_err(|e| format!("Failed to write default settings: {}", e))?;
    }

    let mut settings = settings_manager.get().clone();
    if let Some(minutes) = args.idle_timeout_minutes {
        settings.auto_lock_timeout_minutes = minutes;
    }

    let config = SessionConfig::from(settings);
    config
        .kdf
        .check_strength()
        .map_err(|e| format!("Refusing KDF settings: {}", e))?;
    match config.idle_timeout {
        Some(timeout) => info!("Auto-lock after {} minutes idle", timeout.as_secs() / 60),
        None => info!("Auto-lock disabled"),
    }
    info!("Vault data directory: {:?}", backend.storage_dir());

    let session = VaultSession::with_backend(Arc::new(backend), config);
    let transport = StdioTransport::new(RequestRouter::new(session.clone()));

    transport.run().await?;

    session.lock().await;
    Ok(())
}
