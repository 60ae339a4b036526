//! Recent-search list.
//!
//! Keeps the last [`RecencyStore::CAPACITY`] distinct searches, newest first.
//! Two entries are the same search when keyword, location, category and radius
//! are all equal; re-adding a search moves it to the front with a fresh
//! timestamp instead of duplicating it.

use crate::domain::error::Result;
use crate::domain::{RecentSearch, SearchParams};
use crate::storage::backend::KeyValueStore;
use crate::storage::Written;
use serde_json::Value;
use std::sync::Arc;

/// Durable, bounded, deduplicated list of past searches.
///
/// # Examples
///
/// ```
/// use gigsearch::domain::SearchParams;
/// use gigsearch::storage::{MemoryStore, RecencyStore};
/// use std::sync::Arc;
///
/// let mut store = RecencyStore::load(Arc::new(MemoryStore::new()), "tmv2:recent");
/// let params = SearchParams::new("jazz", "25", "default", "Chicago, IL");
/// store.add(&params).logged("add recent");
/// store.add(&params).logged("add recent");
/// assert_eq!(store.list().len(), 1);
/// ```
pub struct RecencyStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    entries: Vec<RecentSearch>,
}

impl std::fmt::Debug for RecencyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecencyStore")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl RecencyStore {
    /// Maximum number of entries kept.
    pub const CAPACITY: usize = 10;

    /// Loads the list stored under `key`.
    ///
    /// Never fails: an unreadable backend or a value that is not a list yields
    /// an empty store. Individual malformed entries are skipped, duplicates are
    /// dropped (the first, newest occurrence wins) and the list is cut to
    /// capacity.
    pub fn load(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let _span = tracing::debug_span!("recent_load", key = %key).entered();

        let entries = match backend.get(&key) {
            Ok(Some(value)) => decode_entries(value),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read recent searches, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(count = entries.len(), "recent searches loaded");
        Self {
            backend,
            key,
            entries,
        }
    }

    /// Re-reads the stored list, discarding the in-memory copy.
    pub fn reload(&mut self) {
        let backend = Arc::clone(&self.backend);
        *self = Self::load(backend, std::mem::take(&mut self.key));
    }

    /// Entries newest first.
    #[must_use]
    pub fn list(&self) -> &[RecentSearch] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct non-empty keywords in recency order.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        distinct_keywords(&self.entries)
    }

    /// Records `params` as the newest search, stamped with the current time.
    pub fn add(&mut self, params: &SearchParams) -> Written<RecentSearch> {
        self.add_at(params, chrono::Utc::now().timestamp_millis())
    }

    /// Records `params` as the newest search with an explicit timestamp.
    ///
    /// Any entry with the same identity key is removed first, then the list is
    /// truncated to capacity.
    pub fn add_at(&mut self, params: &SearchParams, timestamp: i64) -> Written<RecentSearch> {
        let _span = tracing::debug_span!("recent_add", keyword = %params.keyword).entered();

        let entry = RecentSearch::from_params(params, timestamp);
        self.entries.retain(|existing| !existing.same_search(&entry));
        self.entries.insert(0, entry.clone());
        self.entries.truncate(Self::CAPACITY);

        tracing::debug!(count = self.entries.len(), "recent search recorded");
        Written::new(entry, self.flush())
    }

    /// Removes every entry.
    pub fn clear(&mut self) -> Written<()> {
        let _span = tracing::debug_span!("recent_clear").entered();
        self.entries.clear();
        Written::new((), self.backend.remove(&self.key))
    }

    /// Writes the in-memory list to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be encoded or the backend rejects
    /// the write.
    pub fn flush(&self) -> Result<()> {
        let value = serde_json::to_value(&self.entries)?;
        self.backend.set(&self.key, value)
    }
}

/// Distinct non-empty keywords of `entries`, in order of first appearance.
pub(crate) fn distinct_keywords(entries: &[RecentSearch]) -> Vec<&str> {
    let mut keywords: Vec<&str> = Vec::new();
    for entry in entries {
        let keyword = entry.keyword.trim();
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}

fn decode_entries(value: Value) -> Vec<RecentSearch> {
    let Value::Array(items) = value else {
        tracing::warn!("stored recent searches are not a list, ignoring");
        return Vec::new();
    };

    let mut entries: Vec<RecentSearch> = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<RecentSearch>(item) {
            Ok(entry) => {
                if !entries.iter().any(|e| e.same_search(&entry)) {
                    entries.push(entry);
                }
            }
            Err(e) => tracing::debug!(error = %e, "skipping malformed recent search"),
        }
    }
    entries.truncate(RecencyStore::CAPACITY);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::backend::testing::FlakyStore;
    use crate::storage::MemoryStore;
    use serde_json::json;

    const KEY: &str = "tmv2:recent";

    fn params(keyword: &str, location: &str) -> SearchParams {
        SearchParams::new(keyword, "10", "default", location)
    }

    #[test]
    fn never_exceeds_capacity_and_keeps_keys_unique() {
        let mut store = RecencyStore::load(Arc::new(MemoryStore::new()), KEY);
        for i in 0..25 {
            let p = params(&format!("kw{}", i % 13), "Austin, TX");
            assert!(store.add_at(&p, i).is_durable());
            assert!(store.len() <= RecencyStore::CAPACITY);
        }
        let list = store.list();
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                assert!(!a.same_search(b));
            }
        }
        assert_eq!(list[0].keyword, "kw11");
        assert_eq!(list[0].timestamp, 24);
    }

    #[test]
    fn duplicate_moves_to_front_without_growing() {
        let mut store = RecencyStore::load(Arc::new(MemoryStore::new()), KEY);
        let jazz = params("jazz", "Chicago, IL");
        store.add_at(&jazz, 1).logged("test");
        store.add_at(&params("rock", "Chicago, IL"), 2).logged("test");
        let before = store.len();

        store.add_at(&jazz, 3).logged("test");
        assert_eq!(store.len(), before);
        assert_eq!(store.list()[0].keyword, "jazz");
        assert_eq!(store.list()[0].timestamp, 3);
    }

    #[test]
    fn differs_by_any_field_is_a_new_entry() {
        let mut store = RecencyStore::load(Arc::new(MemoryStore::new()), KEY);
        store.add_at(&params("jazz", "Chicago, IL"), 1).logged("test");
        store.add_at(&params("jazz", "chicago, il"), 2).logged("test");
        store
            .add_at(&SearchParams::new("jazz", "25", "default", "Chicago, IL"), 3)
            .logged("test");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn persists_across_loads() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = RecencyStore::load(Arc::clone(&backend), KEY);
        store.add_at(&params("nba", "Boston, MA"), 7).logged("test");

        let stored = backend.get(KEY).unwrap().unwrap();
        assert_eq!(stored[0]["ts"], json!(7));

        let reloaded = RecencyStore::load(backend, KEY);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn malformed_data_loads_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(KEY, json!("definitely not a list")).unwrap();
        assert!(RecencyStore::load(backend, KEY).is_empty());
    }

    #[test]
    fn malformed_items_are_skipped_and_duplicates_collapsed() {
        let backend = Arc::new(MemoryStore::new());
        let entry = json!({"keyword": "jazz", "location": "L", "category": "default", "radius": "10", "ts": 2});
        backend
            .set(KEY, json!([entry, {"keyword": 5}, entry, null]))
            .unwrap();
        let store = RecencyStore::load(backend, KEY);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].timestamp, 2);
    }

    #[test]
    fn unreadable_backend_loads_empty() {
        let store = RecencyStore::load(Arc::new(FlakyStore::failing_reads()), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn failed_flush_still_updates_memory() {
        let mut store = RecencyStore::load(Arc::new(FlakyStore::failing_writes()), KEY);
        let written = store.add_at(&params("comedy", "Denver, CO"), 1);
        assert!(!written.is_durable());
        assert_eq!(written.value.keyword, "comedy");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keywords_are_distinct_and_skip_blanks() {
        let mut store = RecencyStore::load(Arc::new(MemoryStore::new()), KEY);
        store.add_at(&params("jazz", "A"), 1).logged("test");
        store.add_at(&params("  ", "A"), 2).logged("test");
        store.add_at(&params("rock", "A"), 3).logged("test");
        store.add_at(&params("jazz", "B"), 4).logged("test");
        assert_eq!(store.keywords(), vec!["jazz", "rock"]);
    }

    #[test]
    fn clear_empties_memory_and_backend() {
        let backend: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = RecencyStore::load(Arc::clone(&backend), KEY);
        store.add_at(&params("jazz", "A"), 1).logged("test");
        assert!(store.clear().is_durable());
        assert!(store.is_empty());
        assert!(backend.get(KEY).unwrap().is_none());
    }
}
