//! License entitlement state.
//!
//! The gate owns the stored [`LicenseRecord`] and the session-level
//! `licensed` flag. Network calls are split from state changes: the
//! `apply_*` methods take a finished client result, so the async call can
//! run elsewhere and hand its outcome back to the owner of the gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::LicenseClient;
use super::response::{ActivationResponse, LicenseMeta, ValidationResponse};
use crate::error::LicenseError;
use crate::plant::PlantType;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Plant types available without a license.
pub const FREE_PLANT_TYPES: [PlantType; 1] = [PlantType::Cactus];

const ACTIVE_STATUS: &str = "active";

/// Persisted proof of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub key: String,
    pub email: String,
    pub instance_id: String,
    pub device_name: String,
    pub activated_at: DateTime<Utc>,
}

impl LicenseRecord {
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty() && !self.email.is_empty()
    }
}

/// Store and product the license must belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductIdentity {
    pub store_id: u64,
    pub product_id: u64,
}

#[derive(Debug, Clone)]
pub struct LicenseGate {
    expected: ProductIdentity,
    record: Option<LicenseRecord>,
    licensed: bool,
    last_error: Option<LicenseError>,
}

impl LicenseGate {
    pub fn new(expected: ProductIdentity) -> Self {
        Self {
            expected,
            record: None,
            licensed: false,
            last_error: None,
        }
    }

    /// Restore the stored record. It counts as licensed until a validation says otherwise.
    pub fn load(expected: ProductIdentity, store: &dyn KeyValueStore) -> Self {
        let record: Option<LicenseRecord> = load_json(store, keys::LICENSE);
        let licensed = record.as_ref().is_some_and(LicenseRecord::is_valid);
        Self {
            expected,
            record,
            licensed,
            last_error: None,
        }
    }

    pub fn is_licensed(&self) -> bool {
        self.licensed
    }

    pub fn record(&self) -> Option<&LicenseRecord> {
        self.record.as_ref()
    }

    pub fn last_error(&self) -> Option<&LicenseError> {
        self.last_error.as_ref()
    }

    pub fn available_plant_types(&self) -> Vec<PlantType> {
        if self.licensed {
            PlantType::ALL.to_vec()
        } else {
            FREE_PLANT_TYPES.to_vec()
        }
    }

    pub fn can_use_plant(&self, plant_type: PlantType) -> bool {
        self.available_plant_types().contains(&plant_type)
    }

    pub fn can_customize_timer_durations(&self) -> bool {
        self.licensed
    }

    /// Key of the stored record, for a validation request.
    pub fn stored_key(&self) -> Result<String, LicenseError> {
        self.record
            .as_ref()
            .map(|r| r.key.clone())
            .ok_or(LicenseError::NoLicenseStored)
    }

    /// Judge an activation result. Only success changes state.
    pub fn apply_activation(
        &mut self,
        store: &dyn KeyValueStore,
        key: &str,
        email: &str,
        device_name: &str,
        now: DateTime<Utc>,
        result: Result<ActivationResponse, LicenseError>,
    ) -> Result<(), LicenseError> {
        let outcome = result.and_then(|resp| {
            if let Some(error) = resp.error {
                return Err(LicenseError::ApiError(error));
            }
            self.check_meta(resp.meta.as_ref(), email)?;
            if !resp.activated {
                return Err(LicenseError::ActivationFailed);
            }
            Ok(resp.instance.map(|i| i.id).unwrap_or_default())
        });

        match outcome {
            Ok(instance_id) => {
                let record = LicenseRecord {
                    key: key.to_string(),
                    email: email.to_string(),
                    instance_id,
                    device_name: device_name.to_string(),
                    activated_at: now,
                };
                if let Err(e) = save_json(store, keys::LICENSE, &record) {
                    tracing::warn!(error = %e, "license activated but could not be saved");
                }
                tracing::info!(device = device_name, "license activated");
                self.record = Some(record);
                self.licensed = true;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "license activation rejected");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Judge a validation result for the record whose key was sent.
    ///
    /// An explicit invalid or inactive verdict clears the stored record. Any
    /// other failure keeps the record for a later retry but drops the
    /// session to unlicensed.
    pub fn apply_validation(
        &mut self,
        store: &dyn KeyValueStore,
        key: &str,
        result: Result<ValidationResponse, LicenseError>,
    ) -> Result<(), LicenseError> {
        let Some(record) = self.record.as_ref() else {
            return Err(LicenseError::NoLicenseStored);
        };
        if record.key != key {
            // The record changed while the request was in flight.
            tracing::debug!("discarding validation for a replaced license");
            return Err(LicenseError::NoLicenseStored);
        }
        let email = record.email.clone();

        let outcome = result.and_then(|resp| {
            if let Some(error) = resp.error {
                return Err(LicenseError::ApiError(error));
            }
            self.check_meta(resp.meta.as_ref(), &email)?;
            if !resp.valid {
                return Err(LicenseError::LicenseInvalid);
            }
            let status = resp
                .license_key
                .map(|k| k.status)
                .ok_or(LicenseError::InvalidServerResponse)?;
            if status != ACTIVE_STATUS {
                return Err(LicenseError::LicenseNotActive(status));
            }
            Ok(())
        });

        match outcome {
            Ok(()) => {
                self.licensed = true;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                if e.clears_record() {
                    tracing::warn!(error = %e, "license revoked, clearing stored record");
                    self.clear(store);
                } else if e.is_transport() {
                    tracing::warn!(error = %e, "license server unreachable, keeping stored record");
                    self.licensed = false;
                } else {
                    tracing::warn!(error = %e, "license validation failed, keeping stored record");
                    self.licensed = false;
                }
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Local-only deactivation.
    pub fn deactivate(&mut self, store: &dyn KeyValueStore) {
        self.clear(store);
        self.last_error = None;
    }

    pub async fn activate(
        &mut self,
        client: &dyn LicenseClient,
        store: &dyn KeyValueStore,
        key: &str,
        email: &str,
        device_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LicenseError> {
        let result = client.activate(key, device_name).await;
        self.apply_activation(store, key, email, device_name, now, result)
    }

    pub async fn validate(
        &mut self,
        client: &dyn LicenseClient,
        store: &dyn KeyValueStore,
    ) -> Result<(), LicenseError> {
        let key = match self.stored_key() {
            Ok(key) => key,
            Err(e) => {
                self.licensed = false;
                return Err(e);
            }
        };
        let result = client.validate(&key).await;
        self.apply_validation(store, &key, result)
    }

    fn check_meta(&self, meta: Option<&LicenseMeta>, email: &str) -> Result<(), LicenseError> {
        let meta = meta.ok_or(LicenseError::InvalidServerResponse)?;
        if meta.store_id != self.expected.store_id || meta.product_id != self.expected.product_id {
            return Err(LicenseError::InvalidProduct);
        }
        if meta.customer_email.trim().to_lowercase() != email.trim().to_lowercase() {
            return Err(LicenseError::EmailMismatch);
        }
        Ok(())
    }

    fn clear(&mut self, store: &dyn KeyValueStore) {
        if let Err(e) = store.remove(keys::LICENSE) {
            tracing::warn!(error = %e, "could not remove stored license");
        }
        self.record = None;
        self.licensed = false;
    }
}
