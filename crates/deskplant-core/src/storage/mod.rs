mod config;
mod device_id;
pub mod kv;
mod preferences;

pub use config::{Config, LicenseConfig, PlantConfig, TimerConfig};
pub use device_id::{device_identifier, DEVICE_ID_PREFIX};
pub use kv::{keys, load_json, save_json, KeyValueStore, MemoryStore, SqliteStore};
pub use preferences::{Language, Preferences};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/deskplant[-dev]/` based on DESKPLANT_ENV.
///
/// Set DESKPLANT_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("DESKPLANT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("deskplant-dev")
    } else {
        base_dir.join("deskplant")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
