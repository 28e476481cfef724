use clap::Subcommand;
use std::path::PathBuf;

use super::{open_coordinator, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write plant and stats to a JSON file
    Export { path: PathBuf },
    /// Replace plant and stats from an exported JSON file
    Import { path: PathBuf },
}

pub fn run(action: DataAction) -> CmdResult {
    let mut coordinator = open_coordinator()?;

    match action {
        DataAction::Export { path } => {
            std::fs::write(&path, coordinator.export_data()?)?;
            println!("exported to {}", path.display());
        }
        DataAction::Import { path } => {
            let data = std::fs::read_to_string(&path)?;
            if !coordinator.import_data(&data) {
                return Err(format!("{} is not a DeskPlant export", path.display()).into());
            }
            println!("imported from {}", path.display());
        }
    }
    Ok(())
}
