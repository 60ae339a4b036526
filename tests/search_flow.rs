//! End-to-end search flow through the public API, with the directory and the
//! device position faked and storage on disk.

use async_trait::async_trait;
use gigsearch::directory::{EventDirectory, ReverseGeocode};
use gigsearch::domain::{Coordinates, MappedEvent, SearchForm, SearchParams};
use gigsearch::location::{DeviceGeolocation, GeolocationError, LocationResolver, PositionOptions};
use gigsearch::storage::{FavoritesStore, JsonFileStore, KeyValueStore, RecencyStore, StorageKeys, Toggle};
use gigsearch::suggest::SuggestionGroup;
use gigsearch::{GigsearchError, Result, SearchSession, SubmitOutcome};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct StubDirectory {
    searches: Mutex<Vec<SearchParams>>,
}

#[async_trait]
impl EventDirectory for StubDirectory {
    async fn search(&self, params: &SearchParams) -> Result<Vec<MappedEvent>> {
        self.searches.lock().unwrap().push(params.clone());
        Ok(vec![MappedEvent {
            id: format!("{}-1", params.keyword),
            name: format!("{} night", params.keyword),
            date_time: "2026-11-20 20:00:00".to_string(),
            genre: "Jazz".to_string(),
            venue: "Green Mill".to_string(),
            icon: String::new(),
        }])
    }

    async fn event_detail(&self, id: &str) -> Result<Value> {
        Ok(json!({ "id": id, "name": "Jazz night" }))
    }

    async fn venue(&self, _keyword: &str) -> Result<Value> {
        Err(GigsearchError::Directory("no venues here".to_string()))
    }

    async fn reverse_geocode(&self, _coordinates: Coordinates) -> Result<ReverseGeocode> {
        Ok(ReverseGeocode {
            location: Some("Chicago, IL".to_string()),
            formatted_address: None,
        })
    }
}

struct DeniedGeolocation;

#[async_trait]
impl DeviceGeolocation for DeniedGeolocation {
    async fn current_position(&self, _options: &PositionOptions) -> std::result::Result<Coordinates, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

fn open_session(data_dir: &Path) -> (SearchSession, Arc<StubDirectory>) {
    let directory = Arc::new(StubDirectory::default());
    let backend: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(data_dir.join("state.json")).unwrap());
    let keys = StorageKeys::default();
    let resolver = LocationResolver::new(None, Arc::new(DeniedGeolocation), directory.clone());
    let session = SearchSession::new(
        directory.clone(),
        resolver,
        RecencyStore::load(Arc::clone(&backend), keys.recent.clone()),
        FavoritesStore::load(backend, &keys),
    );
    (session, directory)
}

fn jazz_in_chicago() -> SearchForm {
    SearchForm {
        keyword: "jazz".to_string(),
        location: "Chicago, IL".to_string(),
        radius: "25".to_string(),
        ..SearchForm::default()
    }
}

#[tokio::test]
async fn submitting_a_search_records_one_recent_entry() {
    let dir = TempDir::new().unwrap();
    let (session, directory) = open_session(dir.path());

    let before = chrono::Utc::now().timestamp_millis();
    let outcome = session.submit(&jazz_in_chicago()).await;
    let after = chrono::Utc::now().timestamp_millis();

    assert_eq!(outcome.events().len(), 1);
    assert_eq!(
        directory.searches.lock().unwrap().as_slice(),
        &[SearchParams::new("jazz", "25", "default", "Chicago, IL")]
    );

    let recent = session.recent_searches();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].keyword, "jazz");
    assert_eq!(recent[0].location, "Chicago, IL");
    assert_eq!(recent[0].category, "default");
    assert_eq!(recent[0].radius, "25");
    assert!((before..=after).contains(&recent[0].timestamp));

    session.submit(&jazz_in_chicago()).await;
    assert_eq!(session.recent_searches().len(), 1);
    assert!(session.recent_searches()[0].timestamp >= recent[0].timestamp);
}

#[tokio::test]
async fn state_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();
    {
        let (session, _) = open_session(dir.path());
        session.submit(&jazz_in_chicago()).await;
        let detail = session.event_detail("jazz-1").await.unwrap();
        assert_eq!(
            session.toggle_favorite(&detail.favorite_snapshot()),
            Toggle::Added { show_local_notice: true }
        );
    }

    let (session, _) = open_session(dir.path());
    assert_eq!(session.recent_searches().len(), 1);
    assert!(session.is_favorite("jazz-1"));
    assert!(session.history().is_empty());

    let other = SearchForm {
        keyword: "blues".to_string(),
        ..jazz_in_chicago()
    };
    let outcome = session.submit(&other).await;
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(
        session.toggle_favorite(&MappedEvent {
            id: "blues-1".to_string(),
            ..MappedEvent::default()
        }),
        Toggle::Added { show_local_notice: false }
    );
}

#[tokio::test]
async fn suggestions_follow_recent_searches() {
    let dir = TempDir::new().unwrap();
    let (session, _) = open_session(dir.path());

    let groups = session.suggest("").unwrap();
    assert!(matches!(groups[0], SuggestionGroup::Keywords { .. }));

    let groups = session.suggest("tay").unwrap();
    assert!(groups[0].keywords().contains(&"Taylor Swift"));

    session.submit(&jazz_in_chicago()).await;
    let groups = session.suggest("chic").unwrap();
    assert!(matches!(&groups[0], SuggestionGroup::RecentSearches(entries) if entries[0].keyword == "jazz"));
}

#[tokio::test]
async fn denied_detection_asks_for_a_location() {
    let dir = TempDir::new().unwrap();
    let (session, directory) = open_session(dir.path());

    let form = SearchForm {
        location: String::new(),
        auto_detect: true,
        ..jazz_in_chicago()
    };
    assert!(matches!(session.submit(&form).await, SubmitOutcome::LocationUnavailable(_)));
    assert!(directory.searches.lock().unwrap().is_empty());
    assert!(session.recent_searches().is_empty());
    assert!(session.venue_detail("Green Mill").await.is_err());
}
