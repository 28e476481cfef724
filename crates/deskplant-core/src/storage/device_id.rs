// Device identifier used as the license instance name.
// Format: "deskplant-<uuid>"

use uuid::Uuid;

use super::kv::{keys, KeyValueStore};
use crate::error::StorageError;

pub const DEVICE_ID_PREFIX: &str = "deskplant-";

/// Get or create the device identifier stored under `deviceIdentifier`.
/// A stored value without the expected prefix is replaced.
pub fn device_identifier(store: &dyn KeyValueStore) -> Result<String, StorageError> {
    let existing = match store.load(keys::DEVICE_IDENTIFIER) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "device identifier unreadable, generating a new one");
            None
        }
    };
    if let Some(id) = existing.map(|s| s.trim().to_string()) {
        if id.starts_with(DEVICE_ID_PREFIX) {
            return Ok(id);
        }
        tracing::warn!(%id, "ignoring malformed device identifier");
    }

    let id = format!("{}{}", DEVICE_ID_PREFIX, Uuid::new_v4());
    store.save(keys::DEVICE_IDENTIFIER, &id)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn creates_once_and_reuses() {
        let store = MemoryStore::new();
        let first = device_identifier(&store).unwrap();
        assert!(first.starts_with(DEVICE_ID_PREFIX));
        assert_eq!(first.len(), DEVICE_ID_PREFIX.len() + 36);
        assert_eq!(device_identifier(&store).unwrap(), first);
    }

    #[test]
    fn replaces_malformed_value() {
        let store = MemoryStore::new();
        store.save(keys::DEVICE_IDENTIFIER, "garbage").unwrap();
        let id = device_identifier(&store).unwrap();
        assert!(id.starts_with(DEVICE_ID_PREFIX));
        assert_eq!(store.load(keys::DEVICE_IDENTIFIER).unwrap(), Some(id));
    }
}
