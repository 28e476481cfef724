mod kind;
mod state;

pub use kind::PlantType;
pub use state::{HealthStatus, PlantState, MAX_HEALTH, MIN_HEALTH};
