//! Key-value persistence.
//!
//! Every persisted record is a JSON string under a fixed key. Reads that fail
//! or do not decode against the current field set are treated as absent, so
//! callers fall back to fresh defaults instead of a half-populated record.

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Storage keys.
pub mod keys {
    pub const PLANT_STATE: &str = "plantState";
    pub const DAILY_STATS: &str = "dailyStats";
    pub const LICENSE: &str = "license";
    pub const DEVICE_IDENTIFIER: &str = "deviceIdentifier";
    pub const ONBOARDING_COMPLETED: &str = "hasCompletedOnboarding";
    pub const SOUND_ENABLED: &str = "notificationSoundEnabled";
    pub const LANGUAGE: &str = "appLanguage";
    pub const SESSIONS_COMPLETED: &str = "sessionsCompleted";
}

/// Opaque string store the rest of the crate persists through.
pub trait KeyValueStore: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + Sync> KeyValueStore for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Load and decode a JSON record. Any failure reads as `None`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "persistence read failed, using defaults");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored record does not decode, using defaults");
            None
        }
    }
}

pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::EncodeFailed {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.save(key, &json)
}

/// SQLite-backed store with a single `kv` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `~/.config/deskplant/deskplant.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> crate::error::Result<Self> {
        let path = super::data_dir()?.join("deskplant.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests and ephemeral runs).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn sqlite_roundtrip_and_remove() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(store.load("test").unwrap().is_none());
        store.save("test", "hello").unwrap();
        assert_eq!(store.load("test").unwrap().unwrap(), "hello");
        store.save("test", "again").unwrap();
        assert_eq!(store.load("test").unwrap().unwrap(), "again");
        store.remove("test").unwrap();
        assert!(store.load("test").unwrap().is_none());
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        SqliteStore::open_at(&path).unwrap().save("k", "v").unwrap();
        let reopened = SqliteStore::open_at(&path).unwrap();
        assert_eq!(reopened.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn partial_record_reads_as_absent() {
        let store = MemoryStore::new();
        store.save("rec", r#"{"name":"x"}"#).unwrap();
        assert!(load_json::<Record>(&store, "rec").is_none());
    }

    #[test]
    fn garbage_reads_as_absent() {
        let store = MemoryStore::new();
        store.save("rec", "not json").unwrap();
        assert!(load_json::<Record>(&store, "rec").is_none());
    }

    #[test]
    fn json_helpers_roundtrip() {
        let store = MemoryStore::new();
        let rec = Record { name: "fern".into(), count: 3 };
        save_json(&store, "rec", &rec).unwrap();
        assert_eq!(load_json::<Record>(&store, "rec"), Some(rec));
    }

    #[test]
    fn shared_store_sees_writes() {
        let shared = Arc::new(MemoryStore::new());
        let handle: Box<dyn KeyValueStore> = Box::new(Arc::clone(&shared));
        handle.save("k", "v").unwrap();
        assert_eq!(shared.load("k").unwrap().as_deref(), Some("v"));
    }
}
