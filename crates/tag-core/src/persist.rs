//! Local key-value persistence.
//!
//! Values are JSON. Reads fail open: a missing key or a value that no
//! longer parses yields the caller's default.

use crate::error::PersistError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A synchronous string store in the shape of browser `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;

    fn remove(&mut self, key: &str);
}

/// Keys under which each entity is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub column_mapping: String,
    pub vault: String,
    pub bindings: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            column_mapping: "std_mapping".to_string(),
            vault: "std_history".to_string(),
            bindings: "std_layer_mapping".to_string(),
        }
    }
}

/// Read and decode `key`, or `None` if it is absent or unreadable.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring unreadable `{key}`: {e}");
            None
        }
    }
}

/// [`load`], falling back to `T::default()`.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    load(store, key).unwrap_or_default()
}

/// Encode and write `value` under `key`.
pub fn save<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// In-process store, for tests and hosts without browser storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
