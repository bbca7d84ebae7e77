//! Local key-value preferences
//!
//! Small string values that live beside the record store: the recognition
//! API credential and the daily scan counter.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{SpendlogError, SpendlogResult};

use super::file_io::{read_json, write_json_atomic};

/// String key-value persistence
pub trait KeyValueStore {
    /// Read a value, `None` when the key was never set
    fn get(&self, key: &str) -> SpendlogResult<Option<String>>;

    /// Write a value, durable once this returns
    fn set(&self, key: &str, value: &str) -> SpendlogResult<()>;
}

/// Key-value store persisted as a flat JSON object
pub struct JsonKeyValueStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl JsonKeyValueStore {
    /// Open the store, reading existing values if the file exists
    pub fn open(path: PathBuf) -> SpendlogResult<Self> {
        let values: BTreeMap<String, String> = read_json(&path)?;
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }
}

impl KeyValueStore for JsonKeyValueStore {
    fn get(&self, key: &str) -> SpendlogResult<Option<String>> {
        let values = self.values.read().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SpendlogResult<()> {
        let mut values = self.values.write().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        write_json_atomic(&self.path, &next)?;
        *values = next;
        Ok(())
    }
}

/// Non-persistent store, for tests and one-off runs
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> SpendlogResult<Option<String>> {
        let values = self.values.read().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SpendlogResult<()> {
        let mut values = self.values.write().map_err(|e| {
            SpendlogError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
