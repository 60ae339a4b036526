//! Storage layer for recent searches and favorites.
//!
//! Durable state is a few namespaced JSON documents behind a
//! [`KeyValueStore`]. Two stores sit on top of it and keep their working set in
//! memory, flushing synchronously after every mutation:
//!
//! - [`RecencyStore`]: the last ten distinct searches, newest first
//! - [`FavoritesStore`]: saved event snapshots keyed by event id
//!
//! Storage failures never stop the caller. Mutations return a [`Written`]
//! carrying the in-memory result together with the flush outcome, so callers
//! can log the failure and move on.
//!
//! # Modules
//!
//! - `backend`: Key-value trait, storage keys, in-memory backend
//! - `json`: JSON file backend with atomic writes
//! - `recent`: Bounded, deduplicated recent-search list
//! - `favorites`: Favorite events with toggle semantics

pub mod backend;
pub mod favorites;
pub mod json;
pub mod recent;

pub use backend::{KeyValueStore, MemoryStore, StorageKeys};
pub use favorites::{FavoritesStore, Toggle};
pub use json::JsonFileStore;
pub use recent::RecencyStore;

use crate::domain::error::Result;

/// Result of a store mutation.
///
/// `value` is always the in-memory outcome. `flush` reports whether that
/// outcome also reached durable storage.
#[derive(Debug)]
#[must_use]
pub struct Written<T> {
    pub value: T,
    pub flush: Result<()>,
}

impl<T> Written<T> {
    pub(crate) fn new(value: T, flush: Result<()>) -> Self {
        Self { value, flush }
    }

    /// True if the mutation was persisted.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.flush.is_ok()
    }

    /// Logs a failed flush at warn level and returns the in-memory value.
    pub fn logged(self, operation: &str) -> T {
        if let Err(e) = &self.flush {
            tracing::warn!(operation, error = %e, "storage write failed, continuing in memory");
        }
        self.value
    }
}
