//! Last-active tab persistence
//!
//! Best effort only: a failing store never blocks a switch, it just means
//! the choice is forgotten on reload.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabfold_storage::{Database, StorageError};

use crate::config::TabConfig;

/// Durable key/value storage.
pub trait SettingsBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl SettingsBackend for Database {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get_setting(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_setting(key, value)
    }
}

/// Settings that live as long as the process.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemorySettings {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes the active tab id under one namespaced key.
#[derive(Clone)]
pub struct PreferenceStore {
    key: Option<String>,
    backend: Option<Arc<dyn SettingsBackend>>,
}

impl PreferenceStore {
    pub fn new(key: Option<String>, backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            key,
            backend: Some(backend),
        }
    }

    /// Use the storage key declared in `config`.
    pub fn for_config(config: &TabConfig, backend: Arc<dyn SettingsBackend>) -> Self {
        Self::new(config.storage_key().map(str::to_string), backend)
    }

    /// Nothing is remembered.
    pub fn disabled() -> Self {
        Self {
            key: None,
            backend: None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn save(&self, tab_id: &str) {
        let (Some(key), Some(backend)) = (self.key.as_deref(), self.backend.as_ref()) else {
            return;
        };

        if let Err(e) = backend.write(key, tab_id) {
            tracing::debug!(key = %key, error = %e, "Tab preference not saved");
        }
    }

    pub fn load(&self) -> Option<String> {
        let (Some(key), Some(backend)) = (self.key.as_deref(), self.backend.as_ref()) else {
            return None;
        };

        match backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Tab preference not loaded");
                None
            }
        }
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("key", &self.key)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Backend whose every call fails, like a browser with storage disabled.
    pub(crate) struct UnavailableSettings;

    impl SettingsBackend for UnavailableSettings {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_memory_roundtrip() {
        let store = PreferenceStore::new(
            Some("active-tab".to_string()),
            Arc::new(MemorySettings::new()),
        );
        assert_eq!(store.load(), None);

        store.save("history");
        assert_eq!(store.load().as_deref(), Some("history"));
    }

    #[test]
    fn test_without_key_is_noop() {
        let backend = Arc::new(MemorySettings::new());
        let store = PreferenceStore::new(None, backend.clone());

        store.save("history");
        assert_eq!(store.load(), None);
        assert!(backend.values.lock().is_empty());

        let disabled = PreferenceStore::disabled();
        disabled.save("history");
        assert_eq!(disabled.load(), None);
    }

    #[test]
    fn test_failures_are_swallowed() {
        let store = PreferenceStore::new(Some("k".to_string()), Arc::new(UnavailableSettings));
        store.save("history");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_database_backend() {
        let db = Database::open_in_memory().unwrap();
        let store = PreferenceStore::new(Some("k".to_string()), Arc::new(db.clone()));

        store.save("profile");
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("profile"));
        assert_eq!(store.load().as_deref(), Some("profile"));
    }

    #[test]
    fn test_non_string_value_loads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value, updated_at) VALUES ('k', x'00ff', '')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let store = PreferenceStore::new(Some("k".to_string()), Arc::new(db));
        assert_eq!(store.load(), None);
    }
}
