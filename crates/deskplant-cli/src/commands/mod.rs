pub mod config;
pub mod data;
pub mod license;
pub mod plant;
pub mod run;
pub mod stats;

use std::sync::Arc;

use deskplant_core::notify::{EnglishTranslator, LogNotifier};
use deskplant_core::{AppCoordinator, Config, SqliteStore};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Load config and persisted state from the data directory.
pub fn open_coordinator() -> Result<AppCoordinator, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = SqliteStore::open()?;
    Ok(AppCoordinator::new(config, Box::new(store))
        .with_config_path(Config::path()?)
        .with_notifier(Arc::new(LogNotifier))
        .with_translator(Arc::new(EnglishTranslator)))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
