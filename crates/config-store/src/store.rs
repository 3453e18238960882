//! Key-value store backends

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::StoreError;

/// Named-blob store. Values are JSON documents; typed access goes
/// through [`load`] and [`save`].
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Load a typed value from the store.
pub fn load<T: DeserializeOwned>(
    store: &dyn ConfigStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

/// Save a typed value to the store.
pub fn save<T: Serialize>(store: &dyn ConfigStore, key: &str, value: &T) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(key, value)
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value);
        debug!(key, "config entry updated");
        Ok(())
    }
}

/// JSON file store. The whole map is rewritten on each save; the file
/// stays small (operator configuration only).
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the backing file
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "using file config store");
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write_map(&self, map: &HashMap<String, Value>) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string_pretty(map).map_err(|e| StoreError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let _guard = self.guard.lock().map_err(|_| StoreError::Poisoned)?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value);
        self.write_map(&map)?;
        debug!(key, path = %self.path.display(), "config entry persisted");
        Ok(())
    }
}
