use clap::Subcommand;
use deskplant_core::{Clock, PlantType};
use serde_json::json;

use super::{open_coordinator, print_json, CmdResult};

#[derive(Subcommand)]
pub enum PlantAction {
    /// Print the plant as JSON
    Show,
    /// List plant types and which are available
    Types,
    /// Change the plant type
    SetType {
        /// bonsai, cactus, bamboo, sunflower, sakura or monstera
        plant_type: String,
    },
    /// Start over with a fresh plant
    Reset,
}

pub fn run(action: PlantAction) -> CmdResult {
    let mut coordinator = open_coordinator()?;

    match action {
        PlantAction::Show => {
            let plant = coordinator.plant();
            let now = coordinator.clock().now();
            print_json(&json!({
                "type": plant.plant_type(),
                "emoji": plant.emoji(),
                "health": plant.health(),
                "status": plant.health_status(),
                "level": plant.level(),
                "totalSessions": plant.total_sessions(),
                "size": plant.size(),
                "lastWateredAt": plant.last_watered_at(),
                "hoursSinceWatered": plant.hours_since_watered(now),
            }))?;
        }
        PlantAction::Types => {
            let gate = coordinator.license();
            let types: Vec<_> = PlantType::ALL
                .iter()
                .map(|t| {
                    json!({
                        "type": t,
                        "emoji": t.emoji(),
                        "growthRate": t.growth_rate(),
                        "witherRate": t.wither_rate(),
                        "available": gate.can_use_plant(*t),
                    })
                })
                .collect();
            print_json(&types)?;
        }
        PlantAction::SetType { plant_type } => {
            let plant_type: PlantType = plant_type.parse()?;
            coordinator.set_plant_type(plant_type)?;
            println!("plant type set to {plant_type}");
        }
        PlantAction::Reset => {
            coordinator.reset_plant();
            println!("plant reset");
        }
    }
    Ok(())
}
