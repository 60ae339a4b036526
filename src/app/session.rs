//! Search session orchestration.
//!
//! [`SearchSession`] owns everything one user's search flow touches: the
//! durable stores, the result history, the location resolver and the event
//! directory. It implements the submit flow:
//!
//! ```text
//! form ─▶ resolve location ─▶ directory search ─▶ record recent + history
//!              │ empty                 │ newer search started
//!              ▼                       ▼
//!      LocationUnavailable         Superseded
//! ```
//!
//! Storage failures are logged and otherwise ignored. Shared state sits behind
//! `std::sync::Mutex` guards that are never held across an `.await`.

use super::generation::{Generation, GenerationCounter};
use crate::directory::{EventDetail, EventDirectory, VenueDetail};
use crate::domain::error::Result;
use crate::domain::{FavoriteEvent, MappedEvent, RecentSearch, SearchForm, SearchParams};
use crate::history::{recommend, Recommendations, SearchResultEntry, SearchResultHistory};
use crate::location::{LocationResolver, Resolution, LOCATION_UNAVAILABLE};
use crate::storage::{FavoritesStore, RecencyStore, Toggle};
use crate::suggest::{SuggestionEngine, SuggestionGroup};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Instrument;

/// Result of submitting a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The directory answered and the results are now the current entry.
    Completed(SearchResultEntry),
    /// The form lacks a keyword, or a location source.
    NotSubmittable,
    /// Auto-detection found no location; the user should enter one.
    LocationUnavailable(&'static str),
    /// The directory call failed. The search is still remembered as recent.
    Failed { params: SearchParams, message: String },
    /// A newer search started before this one finished; nothing was applied.
    Superseded,
}

impl SubmitOutcome {
    /// Events of a completed search; empty for every other outcome.
    #[must_use]
    pub fn events(&self) -> &[MappedEvent] {
        match self {
            Self::Completed(entry) => &entry.events,
            _ => &[],
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One user's search session.
pub struct SearchSession {
    directory: Arc<dyn EventDirectory>,
    resolver: LocationResolver,
    suggestions: SuggestionEngine,
    recent: Mutex<RecencyStore>,
    favorites: Mutex<FavoritesStore>,
    history: Mutex<SearchResultHistory>,
    generations: GenerationCounter,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("resolver", &self.resolver)
            .field("generations", &self.generations)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    pub fn new(
        directory: Arc<dyn EventDirectory>,
        resolver: LocationResolver,
        recent: RecencyStore,
        favorites: FavoritesStore,
    ) -> Self {
        Self {
            directory,
            resolver,
            suggestions: SuggestionEngine::new(),
            recent: Mutex::new(recent),
            favorites: Mutex::new(favorites),
            history: Mutex::new(SearchResultHistory::new()),
            generations: GenerationCounter::new(),
        }
    }

    /// Submits the search form.
    ///
    /// Resolves the location (auto-detecting if asked), queries the directory
    /// and, if no newer search has started, records the search as recent and
    /// the results in history.
    pub async fn submit(&self, form: &SearchForm) -> SubmitOutcome {
        if !form.is_submittable() {
            return SubmitOutcome::NotSubmittable;
        }
        let generation = self.generations.begin();
        let span = tracing::info_span!("submit", generation = generation.get(), keyword = %form.keyword.trim());

        async {
            let location = self.resolver.resolve(Some(&form.location), form.auto_detect).await;
            if !self.generations.is_current(generation) {
                return SubmitOutcome::Superseded;
            }
            if location.is_empty() {
                tracing::info!("no location for search");
                return SubmitOutcome::LocationUnavailable(LOCATION_UNAVAILABLE);
            }

            self.run(generation, form.to_params(&location)).await
        }
        .instrument(span)
        .await
    }

    /// Re-issues an earlier search.
    ///
    /// The current entry is returned as is. Any other params go back to the
    /// directory and are recorded like a fresh submit.
    pub async fn search_again(&self, params: &SearchParams) -> SubmitOutcome {
        {
            let history = lock(&self.history);
            if let Some(current) = history.current().filter(|entry| &entry.params == params) {
                return SubmitOutcome::Completed(current.clone());
            }
        }
        let generation = self.generations.begin();
        self.run(generation, params.clone())
            .instrument(tracing::info_span!("search_again", generation = generation.get()))
            .await
    }

    async fn run(&self, generation: Generation, params: SearchParams) -> SubmitOutcome {
        tracing::debug!(generation = generation.get(), %params, "querying event directory");
        let result = self.directory.search(&params).await;

        if !self.generations.is_current(generation) {
            tracing::debug!(generation = generation.get(), "search superseded, dropping results");
            return SubmitOutcome::Superseded;
        }

        lock(&self.recent).add(&params).logged("record recent search");

        match result {
            Ok(events) => {
                tracing::info!(count = events.len(), "search completed");
                let entry = lock(&self.history).record(params, events).clone();
                SubmitOutcome::Completed(entry)
            }
            Err(e) => {
                tracing::warn!(error = %e, "event directory search failed");
                SubmitOutcome::Failed {
                    params,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Auto-detects the current location without searching.
    pub async fn locate(&self) -> Resolution {
        self.resolver
            .resolve_detailed(None, true)
            .instrument(tracing::info_span!("locate"))
            .await
    }

    /// Suggestions for the keyword field given what has been typed so far.
    #[must_use]
    pub fn suggest(&self, prefix: &str) -> Option<Vec<SuggestionGroup>> {
        let recent = lock(&self.recent);
        self.suggestions.suggest(prefix, recent.list())
    }

    #[must_use]
    pub fn recent_searches(&self) -> Vec<RecentSearch> {
        lock(&self.recent).list().to_vec()
    }

    pub fn clear_recent_searches(&self) {
        lock(&self.recent).clear().logged("clear recent searches");
    }

    /// Recorded result sets, newest first.
    #[must_use]
    pub fn history(&self) -> Vec<SearchResultEntry> {
        lock(&self.history).list().to_vec()
    }

    #[must_use]
    pub fn current(&self) -> Option<SearchResultEntry> {
        lock(&self.history).current().cloned()
    }

    /// Follow-up searches for the current entry.
    #[must_use]
    pub fn recommendations(&self) -> Option<Recommendations> {
        lock(&self.history).current().map(|entry| recommend(&entry.params))
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        lock(&self.favorites).is_favorite(id)
    }

    /// Saves or unsaves `event`.
    pub fn toggle_favorite(&self, event: &MappedEvent) -> Toggle {
        lock(&self.favorites).toggle(event).logged("toggle favorite")
    }

    pub fn remove_favorite(&self, id: &str) -> bool {
        lock(&self.favorites).remove(id).logged("remove favorite")
    }

    pub fn clear_favorites(&self) -> usize {
        lock(&self.favorites).clear().logged("clear favorites")
    }

    #[must_use]
    pub fn favorites(&self) -> Vec<FavoriteEvent> {
        lock(&self.favorites).list().cloned().collect()
    }

    /// Asks the directory whether it is up.
    ///
    /// # Errors
    ///
    /// Returns the directory's error if it cannot be reached.
    pub async fn directory_health(&self) -> Result<serde_json::Value> {
        self.directory.health().await
    }

    /// Fetches and projects one event.
    ///
    /// # Errors
    ///
    /// Returns the directory's error if the record cannot be fetched.
    pub async fn event_detail(&self, id: &str) -> Result<EventDetail> {
        let raw = self.directory.event_detail(id).await?;
        Ok(EventDetail::from_raw(&raw))
    }

    /// Fetches and projects the first venue matching `keyword`.
    ///
    /// # Errors
    ///
    /// Returns the directory's error if the search cannot be made.
    pub async fn venue_detail(&self, keyword: &str) -> Result<Option<VenueDetail>> {
        let raw = self.directory.venue(keyword).await?;
        Ok(VenueDetail::from_raw(&raw))
    }
}
