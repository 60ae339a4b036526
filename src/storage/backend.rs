//! Key-value backend abstraction.
//!
//! This module defines the [`KeyValueStore`] trait that the durable stores persist
//! through. Durable state is a handful of namespaced keys, each holding one JSON
//! document, much like browser local storage: there is no schema and no query
//! language, just get/set/remove on whole values.
//!
//! # Implementations
//!
//! - [`crate::storage::JsonFileStore`]: one JSON file on disk with atomic writes
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions

use crate::domain::error::{GigsearchError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Abstraction over durable key-value backends.
///
/// All methods take `&self`; implementations use interior mutability so one
/// backend can be shared by several stores through an `Arc`.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read at all.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value, and makes it
    /// durable before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}

/// The storage keys used by one installation.
///
/// Every key is prefixed with a namespace (`tmv2` by default) so several
/// profiles or apps can share a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub recent: String,
    pub favorites: String,
    pub favorites_notice: String,
}

impl StorageKeys {
    /// Namespace used when the configuration does not name one.
    pub const DEFAULT_NAMESPACE: &'static str = "tmv2";

    #[must_use]
    pub fn new(namespace: &str) -> Self {
        Self {
            recent: format!("{namespace}:recent"),
            favorites: format!("{namespace}:favorites"),
            favorites_notice: format!("{namespace}:favorites-local-notice"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAMESPACE)
    }
}

/// In-memory backend.
///
/// Nothing survives the process. Useful for tests and for running without a
/// writable data directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|e| GigsearchError::Storage(format!("memory store poisoned: {e}")))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_namespaced() {
        let keys = StorageKeys::default();
        assert_eq!(keys.recent, "tmv2:recent");
        assert_eq!(keys.favorites, "tmv2:favorites");
        assert_eq!(StorageKeys::new("dev").favorites_notice, "dev:favorites-local-notice");
    }

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", json!([1, 2])).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!([1, 2])));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
    }
}
