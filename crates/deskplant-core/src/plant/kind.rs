use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Plant variants. Each carries fixed growth and wither multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    #[default]
    Bonsai,
    Cactus,
    Bamboo,
    Sunflower,
    Sakura,
    Monstera,
}

impl PlantType {
    pub const ALL: [PlantType; 6] = [
        PlantType::Bonsai,
        PlantType::Cactus,
        PlantType::Bamboo,
        PlantType::Sunflower,
        PlantType::Sakura,
        PlantType::Monstera,
    ];

    /// Multiplier applied to the health gained per watering.
    pub fn growth_rate(self) -> f64 {
        match self {
            PlantType::Bonsai => 0.8,
            PlantType::Cactus => 1.0,
            PlantType::Bamboo => 1.3,
            PlantType::Sunflower => 1.2,
            PlantType::Sakura => 0.9,
            PlantType::Monstera => 1.1,
        }
    }

    /// Multiplier applied to every health loss.
    pub fn wither_rate(self) -> f64 {
        match self {
            PlantType::Bonsai => 1.2,
            PlantType::Cactus => 0.7,
            PlantType::Bamboo => 1.0,
            PlantType::Sunflower => 1.3,
            PlantType::Sakura => 1.4,
            PlantType::Monstera => 0.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlantType::Bonsai => "bonsai",
            PlantType::Cactus => "cactus",
            PlantType::Bamboo => "bamboo",
            PlantType::Sunflower => "sunflower",
            PlantType::Sakura => "sakura",
            PlantType::Monstera => "monstera",
        }
    }

    pub fn name_key(self) -> String {
        format!("plant.type.{}", self.as_str())
    }

    pub fn description_key(self) -> String {
        format!("plant.description.{}", self.as_str())
    }

    pub fn emoji(self) -> &'static str {
        match self {
            PlantType::Bonsai => "🌳",
            PlantType::Cactus => "🌵",
            PlantType::Bamboo => "🎋",
            PlantType::Sunflower => "🌻",
            PlantType::Sakura => "🌸",
            PlantType::Monstera => "🌿",
        }
    }

    /// Shown while health is below 40.
    pub fn wilting_emoji(self) -> &'static str {
        match self {
            PlantType::Bonsai | PlantType::Sakura => "🍂",
            PlantType::Cactus => "🏜️",
            PlantType::Bamboo | PlantType::Monstera => "🍃",
            PlantType::Sunflower => "🥀",
        }
    }

    /// Shown while health is below 20.
    pub fn critical_emoji(self) -> &'static str {
        match self {
            PlantType::Bonsai | PlantType::Sakura | PlantType::Sunflower => "🥀",
            PlantType::Cactus => "💀",
            PlantType::Bamboo | PlantType::Monstera => "🪵",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        PlantType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "plant type",
                value: s.to_string(),
            })
    }
}
