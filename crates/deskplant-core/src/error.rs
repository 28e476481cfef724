//! Core error types for deskplant-core.
//!
//! This module defines the error hierarchy using thiserror. License failures
//! are user-facing, so every [`LicenseError`] also carries a localization key
//! that the presentation layer resolves through its translator.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for deskplant-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// License activation/validation errors
    #[error("License error: {0}")]
    License(#[from] LicenseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Feature requires an active license
    #[error("'{0}' requires DeskPlant Pro")]
    FeatureLocked(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Store is locked by another process
    #[error("Store is locked")]
    Locked,

    /// Value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {message}")]
    EncodeFailed { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Duration outside its allowed range
    #[error("{field} must be between {min_minutes} and {max_minutes} minutes (got {actual_secs}s)")]
    DurationOutOfRange {
        field: &'static str,
        min_minutes: u64,
        max_minutes: u64,
        actual_secs: u64,
    },

    /// Unknown enum value
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// License activation and validation failures.
///
/// None of these are fatal. The gate records the message for display and,
/// except for [`LicenseError::LicenseInvalid`] and
/// [`LicenseError::LicenseNotActive`], leaves the stored record untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    #[error("Could not reach the license server")]
    NetworkUnavailable,

    #[error("Invalid response from the license server")]
    InvalidServerResponse,

    #[error("License server error (HTTP {0})")]
    ServerError(u16),

    #[error("{0}")]
    ApiError(String),

    #[error("This license key is not for DeskPlant")]
    InvalidProduct,

    #[error("Email does not match the license owner")]
    EmailMismatch,

    #[error("License activation failed")]
    ActivationFailed,

    #[error("License is no longer valid")]
    LicenseInvalid,

    #[error("License is not active (status: {0})")]
    LicenseNotActive(String),

    #[error("No license stored")]
    NoLicenseStored,
}

impl LicenseError {
    /// Localization key for the user-facing message.
    pub fn message_key(&self) -> &'static str {
        match self {
            LicenseError::NetworkUnavailable => "license.error.network",
            LicenseError::InvalidServerResponse => "license.error.invalidResponse",
            LicenseError::ServerError(_) => "license.error.serverError",
            LicenseError::ApiError(_) => "license.error.api",
            LicenseError::InvalidProduct => "license.error.invalidProduct",
            LicenseError::EmailMismatch => "license.error.emailMismatch",
            LicenseError::ActivationFailed => "license.error.activationFailed",
            LicenseError::LicenseInvalid => "license.error.invalidLicense",
            LicenseError::LicenseNotActive(_) => "license.error.notActive",
            LicenseError::NoLicenseStored => "license.error.noLicense",
        }
    }

    /// Whether the failure came from the transport rather than the server's verdict.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LicenseError::NetworkUnavailable
                | LicenseError::InvalidServerResponse
                | LicenseError::ServerError(_)
        )
    }

    /// Whether this failure removes the stored license record.
    pub fn clears_record(&self) -> bool {
        matches!(
            self,
            LicenseError::LicenseInvalid | LicenseError::LicenseNotActive(_)
        )
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for LicenseError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LicenseError::InvalidServerResponse
        } else if let Some(status) = err.status() {
            LicenseError::ServerError(status.as_u16())
        } else {
            LicenseError::NetworkUnavailable
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
