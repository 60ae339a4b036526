//! JSON file-based key-value backend.
//!
//! This module provides a simple, human-readable storage implementation using
//! JSON serialization. It uses atomic file writes (write-to-temp + rename) to
//! prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - loads entire file into memory once
//! - **Write**: O(n) - serializes and writes entire dataset
//! - **Best for**: a few keys holding small documents, written on user action

use crate::domain::error::{GigsearchError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// JSON storage container format.
///
/// This is the top-level structure serialized to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Stored documents by namespaced key.
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: 1,
            entries: BTreeMap::new(),
        }
    }
}

/// In-memory copy of the file plus its dirty flag.
#[derive(Debug, Default)]
struct FileState {
    data: StorageData,

    /// Set when the in-memory data differs from the file, e.g. after a failed
    /// write. The next successful write or drop persists it.
    dirty: bool,
}

/// JSON file storage backend.
///
/// The entire dataset is kept in memory and persisted on every modification.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "entries": {
///     "tmv2:favorites": { "G5vYZ9...": { "id": "G5vYZ9...", "name": "..." } },
///     "tmv2:recent": [
///       { "keyword": "jazz", "location": "Chicago, IL", "category": "default", "radius": "25", "ts": 1760000000000 }
///     ]
///   }
/// }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    state: Mutex<FileState>,
}

impl JsonFileStore {
    /// Creates or opens a JSON storage backend.
    ///
    /// If the file exists and parses, loads it. A missing file starts empty. An
    /// unreadable or malformed file is logged and also starts empty; it is
    /// overwritten by the next successful write. Parent directories are created
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gigsearch::storage::JsonFileStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::open(PathBuf::from("/tmp/gigsearch/state.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON storage");

        if let Some(parent) = file_path.parent() {
            tracing::debug!(parent = ?parent, "creating parent directory");
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            tracing::debug!("loading existing data");
            Self::load_from_file(&file_path).unwrap_or_else(|e| {
                tracing::warn!(path = ?file_path, error = %e, "ignoring unreadable storage file");
                StorageData::default()
            })
        } else {
            tracing::debug!("initializing new empty storage");
            StorageData::default()
        };

        tracing::debug!(entry_count = data.entries.len(), "storage initialized");

        Ok(Self {
            file_path,
            state: Mutex::new(FileState { data, dirty: false }),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Loads storage data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| GigsearchError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(
            version = data.version,
            entries = data.entries.len(),
            "loaded storage data"
        );

        Ok(data)
    }

    /// Saves storage data to disk using atomic write.
    ///
    /// Writes to a temporary file first, then atomically renames it to the target path.
    /// This ensures the file is never left in a corrupt state, even if the process crashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    fn save_to_file(&self, state: &mut FileState) -> Result<()> {
        if !state.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        tracing::debug!(path = ?self.file_path, "saving storage data");

        let json = serde_json::to_string_pretty(&state.data)
            .map_err(|e| GigsearchError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        std::fs::rename(&tmp_path, &self.file_path)?;

        state.dirty = false;
        tracing::debug!("storage saved successfully");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, FileState>> {
        self.state
            .lock()
            .map_err(|e| GigsearchError::Storage(format!("storage mutex poisoned: {e}")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let _span = tracing::debug_span!("json_get", key = %key).entered();

        let value = self.lock()?.data.entries.get(key).cloned();

        tracing::debug!(found = value.is_some(), "key lookup complete");
        Ok(value)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _span = tracing::debug_span!("json_set", key = %key).entered();

        let mut state = self.lock()?;
        state.data.entries.insert(key.to_string(), value);
        state.dirty = true;
        self.save_to_file(&mut state)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_remove", key = %key).entered();

        let mut state = self.lock()?;
        if state.data.entries.remove(key).is_none() && !state.dirty {
            tracing::trace!("key absent, nothing to remove");
            return Ok(());
        }
        state.dirty = true;
        self.save_to_file(&mut state)
    }
}

impl Drop for JsonFileStore {
    /// Retries a save that failed earlier, so a transient write error does not
    /// lose the last mutation.
    fn drop(&mut self) {
        let Ok(state) = self.state.get_mut() else {
            return;
        };
        if state.dirty {
            tracing::debug!("saving dirty data on drop");
            let mut state = std::mem::take(state);
            if let Err(e) = self.save_to_file(&mut state) {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}
