//! Favorite events.
//!
//! Favorites are snapshots: toggling an event on copies its fields into a
//! [`FavoriteEvent`], and later changes to the search hit do not reach the
//! stored copy. The map is keyed by event id, so an id is saved at most once.
//!
//! Because favorites only live on this machine, the first time anything is
//! saved the caller is asked to show a one-time notice. Whether that notice
//! was shown is itself persisted, so it appears once per installation rather
//! than once per run.

use crate::domain::error::Result;
use crate::domain::{FavoriteEvent, MappedEvent};
use crate::storage::backend::{KeyValueStore, StorageKeys};
use crate::storage::Written;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a [`FavoritesStore::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The event was saved. `show_local_notice` is true exactly once per
    /// installation.
    Added { show_local_notice: bool },
    /// The event was already saved and has been removed.
    Removed,
}

/// Durable set of favorite events keyed by id.
///
/// # Examples
///
/// ```
/// use gigsearch::domain::MappedEvent;
/// use gigsearch::storage::{FavoritesStore, MemoryStore, StorageKeys, Toggle};
/// use std::sync::Arc;
///
/// let mut favorites = FavoritesStore::load(Arc::new(MemoryStore::new()), &StorageKeys::default());
/// let event = MappedEvent { id: "G5v".into(), name: "Jazz Night".into(), ..Default::default() };
///
/// assert_eq!(favorites.toggle(&event).value, Toggle::Added { show_local_notice: true });
/// assert!(favorites.is_favorite("G5v"));
/// assert_eq!(favorites.toggle(&event).value, Toggle::Removed);
/// ```
pub struct FavoritesStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    notice_key: String,
    entries: BTreeMap<String, FavoriteEvent>,

    /// Set once the local-only notice has been requested, even if persisting
    /// the flag failed, so it is not repeated within this process.
    notice_shown: bool,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("key", &self.key)
            .field("entries", &self.entries.len())
            .field("notice_shown", &self.notice_shown)
            .finish_non_exhaustive()
    }
}

impl FavoritesStore {
    /// Loads favorites and the notice flag.
    ///
    /// Never fails. An unreadable backend or a malformed map yields no
    /// favorites; entries that do not decode are skipped. A map entry whose
    /// snapshot lacks an id takes the id from its key.
    pub fn load(backend: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        let _span = tracing::debug_span!("favorites_load", key = %keys.favorites).entered();

        let entries = match backend.get(&keys.favorites) {
            Ok(Some(value)) => decode_entries(value),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read favorites, starting empty");
                BTreeMap::new()
            }
        };

        let notice_shown = match backend.get(&keys.favorites_notice) {
            Ok(Some(Value::Bool(shown))) => shown,
            Ok(Some(Value::String(s))) => s == "1" || s.eq_ignore_ascii_case("true"),
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "could not read favorites notice flag");
                false
            }
        };

        tracing::debug!(count = entries.len(), notice_shown, "favorites loaded");
        Self {
            backend,
            key: keys.favorites.clone(),
            notice_key: keys.favorites_notice.clone(),
            entries,
            notice_shown,
        }
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FavoriteEvent> {
        self.entries.get(id)
    }

    /// All favorites ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &FavoriteEvent> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves `event` if it is not a favorite, removes it otherwise.
    ///
    /// Toggling twice restores the previous membership. When an add happens
    /// and the local-only notice was never shown, the result asks for it and
    /// the flag is persisted.
    pub fn toggle(&mut self, event: &MappedEvent) -> Written<Toggle> {
        let _span = tracing::debug_span!("favorites_toggle", id = %event.id).entered();

        if self.entries.remove(&event.id).is_some() {
            tracing::debug!("favorite removed");
            return Written::new(Toggle::Removed, self.flush());
        }

        self.entries
            .insert(event.id.clone(), FavoriteEvent::from(event));
        let mut flush = self.flush();

        let show_local_notice = !self.notice_shown;
        if show_local_notice {
            self.notice_shown = true;
            let notice = self.backend.set(&self.notice_key, Value::Bool(true));
            if flush.is_ok() {
                flush = notice;
            }
        }

        tracing::debug!(show_local_notice, "favorite added");
        Written::new(Toggle::Added { show_local_notice }, flush)
    }

    /// Removes `id`. The value is whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Written<bool> {
        let _span = tracing::debug_span!("favorites_remove", id = %id).entered();
        if self.entries.remove(id).is_none() {
            return Written::new(false, Ok(()));
        }
        Written::new(true, self.flush())
    }

    /// Removes every favorite. The notice flag is kept.
    pub fn clear(&mut self) -> Written<usize> {
        let _span = tracing::debug_span!("favorites_clear").entered();
        let removed = self.entries.len();
        self.entries.clear();
        Written::new(removed, self.flush())
    }

    /// Writes the in-memory map to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the map cannot be encoded or the backend rejects
    /// the write.
    pub fn flush(&self) -> Result<()> {
        let value = serde_json::to_value(&self.entries)?;
        self.backend.set(&self.key, value)
    }
}

fn decode_entries(value: Value) -> BTreeMap<String, FavoriteEvent> {
    let Value::Object(map) = value else {
        tracing::warn!("stored favorites are not a map, ignoring");
        return BTreeMap::new();
    };

    map.into_iter()
        .filter_map(|(id, item)| match serde_json::from_value::<FavoriteEvent>(item) {
            Ok(mut favorite) => {
                if favorite.id.is_empty() {
                    favorite.id.clone_from(&id);
                }
                Some((id, favorite))
            }
            Err(e) => {
                tracing::debug!(id = %id, error = %e, "skipping malformed favorite");
                None
            }
        })
        .collect()
}
