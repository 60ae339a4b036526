//! Session-scoped result history.
//!
//! Holds the last few distinct result sets so the user can flip back to an
//! earlier search without hitting the directory again. Nothing here is
//! persisted.

use crate::domain::{MappedEvent, SearchParams};

/// One recorded search and the events it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub params: SearchParams,
    pub events: Vec<MappedEvent>,

    /// Unix milliseconds of the last time this entry was recorded.
    pub timestamp: i64,

    /// Insertion counter, breaks timestamp ties when picking an eviction.
    seq: u64,
}

/// Bounded list of distinct `(params, events)` pairs.
///
/// # Examples
///
/// ```
/// use gigsearch::domain::SearchParams;
/// use gigsearch::history::SearchResultHistory;
///
/// let mut history = SearchResultHistory::new();
/// let params = SearchParams::new("jazz", "25", "default", "Chicago, IL");
/// history.record(params.clone(), Vec::new());
/// assert_eq!(history.current().map(|e| &e.params), Some(&params));
/// ```
#[derive(Debug, Default)]
pub struct SearchResultHistory {
    /// Newest first, except that a replaced entry keeps its position.
    /// Eviction goes by `(timestamp, seq)`, not by position, and never takes
    /// the entry just inserted.
    entries: Vec<SearchResultEntry>,
    last: Option<SearchParams>,
    next_seq: u64,
}

impl SearchResultHistory {
    /// Maximum number of entries kept.
    pub const CAPACITY: usize = 5;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a result set stamped with the current time.
    pub fn record(&mut self, params: SearchParams, events: Vec<MappedEvent>) -> &SearchResultEntry {
        self.record_at(params, events, chrono::Utc::now().timestamp_millis())
    }

    /// Records a result set with an explicit timestamp.
    ///
    /// An entry with identical params is replaced in place, taking the new
    /// events and timestamp. Otherwise the entry is prepended and, past
    /// capacity, the oldest of the other entries by timestamp is evicted.
    /// The returned entry is always the one for `params`.
    pub fn record_at(&mut self, params: SearchParams, events: Vec<MappedEvent>, timestamp: i64) -> &SearchResultEntry {
        let _span = tracing::debug_span!("history_record", keyword = %params.keyword).entered();

        let seq = self.next_seq;
        self.next_seq += 1;
        self.last = Some(params.clone());

        let index = if let Some(index) = self.entries.iter().position(|e| e.params == params) {
            let entry = &mut self.entries[index];
            entry.events = events;
            entry.timestamp = timestamp;
            entry.seq = seq;
            tracing::debug!(index, "replaced result set in place");
            index
        } else {
            self.entries.insert(
                0,
                SearchResultEntry {
                    params,
                    events,
                    timestamp,
                    seq,
                },
            );
            self.evict_overflow();
            0
        };

        &self.entries[index]
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > Self::CAPACITY {
            let oldest = self
                .entries
                .iter()
                .enumerate()
                .skip(1)
                .min_by_key(|(_, e)| (e.timestamp, e.seq))
                .map(|(i, _)| i);
            let Some(oldest) = oldest else { break };
            let evicted = self.entries.remove(oldest);
            tracing::debug!(keyword = %evicted.params.keyword, "evicted oldest result set");
        }
    }

    #[must_use]
    pub fn list(&self) -> &[SearchResultEntry] {
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

    /// The entry for the most recently recorded params.
    #[must_use]
    pub fn current(&self) -> Option<&SearchResultEntry> {
        let last = self.last.as_ref()?;
        self.get(last)
    }

    #[must_use]
    pub fn get(&self, params: &SearchParams) -> Option<&SearchResultEntry> {
        self.entries.iter().find(|e| &e.params == params)
    }

    /// True if `params` is recorded but is not the current entry.
    #[must_use]
    pub fn is_past(&self, params: &SearchParams) -> bool {
        self.get(params).is_some() && self.last.as_ref() != Some(params)
    }
}
