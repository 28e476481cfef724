//! Wire types for the license server's activate/validate endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub activated: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub license_key: Option<LicenseKeyInfo>,
    #[serde(default)]
    pub instance: Option<LicenseInstance>,
    #[serde(default)]
    pub meta: Option<LicenseMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub license_key: Option<LicenseKeyInfo>,
    #[serde(default)]
    pub instance: Option<LicenseInstance>,
    #[serde(default)]
    pub meta: Option<LicenseMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseKeyInfo {
    pub id: u64,
    /// `active`, `inactive`, `expired`, or `disabled`.
    pub status: String,
    pub key: String,
    #[serde(default)]
    pub activation_limit: Option<u32>,
    #[serde(default)]
    pub activation_usage: u32,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseInstance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseMeta {
    pub store_id: u64,
    pub product_id: u64,
    pub customer_email: String,
    #[serde(default)]
    pub order_id: Option<u64>,
    #[serde(default)]
    pub variant_id: Option<u64>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub customer_name: Option<String>,
}
