mod client;
mod gate;
mod response;

pub use client::{LemonSqueezyClient, LicenseClient};
pub use gate::{LicenseGate, LicenseRecord, ProductIdentity, FREE_PLANT_TYPES};
pub use response::{
    ActivationResponse, LicenseInstance, LicenseKeyInfo, LicenseMeta, ValidationResponse,
};
