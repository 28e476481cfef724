use clap::Subcommand;
use deskplant_core::LemonSqueezyClient;
use serde_json::json;

use super::{open_coordinator, print_json, CmdResult};

#[derive(Subcommand)]
pub enum LicenseAction {
    /// Show the stored license
    Status,
    /// Activate a license key on this device
    Activate {
        #[arg(long)]
        key: String,
        #[arg(long)]
        email: String,
    },
    /// Check the stored license with the license server
    Validate,
    /// Forget the stored license on this device
    Deactivate,
}

pub fn run(action: LicenseAction) -> CmdResult {
    let mut coordinator = open_coordinator()?;
    let client = LemonSqueezyClient::new(&coordinator.config().license.api_base_url);

    match action {
        LicenseAction::Status => {
            let gate = coordinator.license();
            let record = gate.record();
            print_json(&json!({
                "licensed": gate.is_licensed(),
                "email": record.map(|r| r.email.as_str()),
                "key": record.map(|r| mask_key(&r.key)),
                "deviceName": record.map(|r| r.device_name.as_str()),
                "activatedAt": record.map(|r| r.activated_at),
                "availablePlantTypes": gate.available_plant_types(),
            }))?;
        }
        LicenseAction::Activate { key, email } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(coordinator.activate_license(&client, key.trim(), email.trim()))?;
            println!("license activated");
        }
        LicenseAction::Validate => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(coordinator.validate_license(&client))?;
            println!("license valid");
        }
        LicenseAction::Deactivate => {
            coordinator.deactivate_license();
            println!("license removed from this device");
        }
    }
    Ok(())
}

/// Show only the last four characters.
fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}
