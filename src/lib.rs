//! gigsearch: the client core of a live-event search application.
//!
//! gigsearch provides:
//! - Location resolution with an IP lookup, device position and reverse geocoding fallback chain
//! - A bounded, deduplicated list of recent searches persisted in a key-value store
//! - Keyword suggestions ranked from recent searches and a popular-keyword corpus
//! - Locally saved favorite events
//! - An in-memory history of result sets with follow-up recommendations
//!
//! The event directory (search, event detail, venue, reverse geocoding) is an
//! external HTTP service reached through the [`directory::EventDirectory`] trait.

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Command line driver (main.rs, args.rs)             │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Submit flow                                      │
//! │  - Single-flight generations                        │
//! └─────────────────────────────────────────────────────┘
//!     │              │               │              │
//! ┌──────────┐ ┌────────────┐ ┌─────────────┐ ┌────────────┐
//! │ location/│ │ storage/   │ │ suggest/    │ │ history/   │
//! │ - IP     │ │ - Recent   │ │ - Corpus    │ │ - Results  │
//! │ - Device │ │ - Favorites│ │ - Ranking   │ │ - Related  │
//! │ - Chain  │ │ - JSON file│ │             │ │            │
//! └──────────┘ └────────────┘ └─────────────┘ └────────────┘
//!     │
//! ┌─────────────────────────────────────────────────────┐
//! │  directory/: Event directory trait + HTTP client    │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Platform paths (infrastructure/)                 │
//! │  - Error types, search and event models (domain/)   │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing-subscriber setup, rotating log file      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Search session and submit flow
//! - [`directory`]: Event directory trait, HTTP binding, record projections
//! - [`domain`]: Core domain types (search params, events, errors)
//! - [`history`]: Result-set history and recommendations
//! - [`infrastructure`]: Platform-specific utilities (paths)
//! - [`location`]: Location resolution
//! - [`observability`]: Tracing subscriber setup
//! - [`storage`]: Key-value backends and the recent/favorites stores
//! - [`suggest`]: Keyword suggestions
//!
//! # Configuration
//!
//! Configuration is read from a TOML file, every key optional:
//!
//! ```toml
//! api_base_url = "http://localhost:8080"
//! ipinfo_token = "abc123"
//! storage_namespace = "tmv2"
//! data_dir = "~/.local/share/gigsearch"
//! request_timeout_secs = 15
//! device_position = "41.8781,-87.6298"
//! trace_level = "debug"
//! log_file = "~/.local/share/gigsearch/gigsearch.log"
//! ```
//!
//! # Key Design Decisions
//!
//! ## Single-Flight Searches
//!
//! Every submit takes a generation number. Results are applied only if no
//! newer submit started in the meantime, so a slow earlier search can never
//! overwrite the state of a later one.
//!
//! ## Explicit Storage Results
//!
//! Store mutations return [`storage::Written`]: the in-memory result plus
//! whether it reached durable storage. A failing backend degrades features
//! to in-memory behaviour instead of failing the search.

pub mod app;
pub mod directory;
pub mod domain;
pub mod history;
pub mod infrastructure;
pub mod location;
pub mod observability;
pub mod storage;
pub mod suggest;

pub use app::{SearchSession, SubmitOutcome};
pub use domain::{Coordinates, GigsearchError, Result, SearchForm, SearchParams};

use directory::http::DEFAULT_BASE_URL;
use directory::{EventDirectory, HttpEventDirectory};
use location::ipinfo::DEFAULT_IPINFO_URL;
use location::{CachingGeolocation, DeviceGeolocation, FixedGeolocation, HttpIpLookup, LocationResolver, NoGeolocation, TokenLookup};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::{FavoritesStore, JsonFileStore, KeyValueStore, MemoryStore, RecencyStore, StorageKeys};

/// Request timeout used when the configuration does not set one.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration.
///
/// Every field has a default, so an empty file or map is a valid
/// configuration pointing at a directory on `localhost:8080`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the event directory. Default: `http://localhost:8080`
    pub api_base_url: String,

    /// IP lookup endpoint. Default: `https://ipinfo.io/`
    pub ipinfo_url: String,

    /// Token for the IP lookup. Without one, auto-detection skips straight
    /// to the device position.
    pub ipinfo_token: Option<String>,

    /// Prefix of the storage keys. Default: `"tmv2"`
    pub storage_namespace: String,

    /// Directory holding `state.json`. Default: platform data dir + `gigsearch`
    pub data_dir: PathBuf,

    /// Timeout for every HTTP request, in seconds. Default: 15
    pub request_timeout_secs: u64,

    /// Fixed position reported as the device location.
    ///
    /// The command line has no positioning hardware of its own; this stands
    /// in for it. `None` means the device step always fails.
    pub device_position: Option<Coordinates>,

    /// Tracing level. Options: `trace`, `debug`, `info`, `warn`, `error`.
    /// Default: `"info"`
    pub trace_level: Option<String>,

    /// Log to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            ipinfo_url: DEFAULT_IPINFO_URL.to_string(),
            ipinfo_token: None,
            storage_namespace: StorageKeys::DEFAULT_NAMESPACE.to_string(),
            data_dir: infrastructure::get_data_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            device_position: None,
            trace_level: None,
            log_file: None,
        }
    }
}

/// Configuration as written in a TOML file, before defaults and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    api_base_url: Option<String>,
    ipinfo_url: Option<String>,
    ipinfo_token: Option<String>,
    storage_namespace: Option<String>,
    data_dir: Option<String>,
    request_timeout_secs: Option<u64>,
    device_position: Option<String>,
    trace_level: Option<String>,
    log_file: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Parses configuration from a string map, as given by `--set key=value`
    /// pairs or the environment.
    ///
    /// # Parsing Rules
    ///
    /// - Blank values count as absent
    /// - `request_timeout_secs`: falls back to 15 on parse error or zero
    /// - `device_position`: `"lat,lon"`, ignored if it does not parse
    /// - `data_dir`, `log_file`: a leading `~` expands to the home directory
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use gigsearch::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("api_base_url".to_string(), "https://gigs.example".to_string());
    /// map.insert("request_timeout_secs".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.api_base_url, "https://gigs.example");
    /// assert_eq!(config.request_timeout_secs, 15);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| map.get(key).cloned();
        let raw = RawConfig {
            api_base_url: text("api_base_url"),
            ipinfo_url: text("ipinfo_url"),
            ipinfo_token: text("ipinfo_token"),
            storage_namespace: text("storage_namespace"),
            data_dir: text("data_dir"),
            request_timeout_secs: map
                .get("request_timeout_secs")
                .and_then(|s| s.trim().parse::<u64>().ok()),
            device_position: text("device_position"),
            trace_level: text("trace_level"),
            log_file: text("log_file"),
        };
        Self::from_raw(raw)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GigsearchError::Config`] for malformed TOML, unknown keys, or
    /// values of the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| GigsearchError::Config(format!("invalid configuration: {e}")))?;
        Ok(Self::from_raw(raw))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GigsearchError::Io`] if the file cannot be read, or
    /// [`GigsearchError::Config`] if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = Self::default();

        let device_position = non_blank(raw.device_position).and_then(|text| {
            let parsed = Coordinates::parse_pair(&text);
            if parsed.is_none() {
                tracing::warn!(device_position = %text, "ignoring unparsable device_position");
            }
            parsed
        });

        Self {
            api_base_url: non_blank(raw.api_base_url).unwrap_or(defaults.api_base_url),
            ipinfo_url: non_blank(raw.ipinfo_url).unwrap_or(defaults.ipinfo_url),
            ipinfo_token: non_blank(raw.ipinfo_token),
            storage_namespace: non_blank(raw.storage_namespace).unwrap_or(defaults.storage_namespace),
            data_dir: non_blank(raw.data_dir)
                .map(|dir| infrastructure::expand_tilde(&dir))
                .unwrap_or(defaults.data_dir),
            request_timeout_secs: raw
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
            device_position,
            trace_level: non_blank(raw.trace_level),
            log_file: non_blank(raw.log_file).map(|file| infrastructure::expand_tilde(&file)),
        }
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Path of the JSON store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        infrastructure::store_file(&self.data_dir)
    }
}

/// Builds a search session wired to the configured collaborators.
///
/// Creates:
/// - An HTTP event directory client at `api_base_url`
/// - An IP lookup client, if `ipinfo_token` is set
/// - A device position source from `device_position`
/// - The JSON file store and the recent/favorites stores on top of it
///
/// If the store file cannot be opened the session falls back to in-memory
/// storage and logs a warning; searches still work, nothing is remembered.
///
/// # Errors
///
/// Returns [`GigsearchError::Config`] for unusable URLs, or
/// [`GigsearchError::Http`] if an HTTP client cannot be built.
pub fn initialize(config: &Config) -> Result<SearchSession> {
    let _span = tracing::debug_span!("initialize").entered();
    let timeout = config.request_timeout();

    let directory: Arc<dyn EventDirectory> = Arc::new(HttpEventDirectory::new(&config.api_base_url, timeout)?);

    let token_lookup = match &config.ipinfo_token {
        Some(token) => Some(TokenLookup {
            source: Arc::new(HttpIpLookup::new(&config.ipinfo_url, timeout)?),
            token: token.clone(),
        }),
        None => None,
    };

    let device: Arc<dyn DeviceGeolocation> = match config.device_position {
        Some(position) => Arc::new(CachingGeolocation::new(FixedGeolocation(position))),
        None => Arc::new(NoGeolocation),
    };

    let backend: Arc<dyn KeyValueStore> = match JsonFileStore::open(config.store_path()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(path = %config.store_path().display(), error = %e, "cannot open store, keeping state in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let keys = StorageKeys::new(&config.storage_namespace);
    let recent = RecencyStore::load(Arc::clone(&backend), keys.recent.clone());
    let favorites = FavoritesStore::load(backend, &keys);
    let resolver = LocationResolver::new(token_lookup, device, Arc::clone(&directory));

    tracing::debug!(
        api_base_url = %config.api_base_url,
        namespace = %config.storage_namespace,
        recent = recent.len(),
        favorites = favorites.len(),
        "session initialized"
    );
    Ok(SearchSession::new(directory, resolver, recent, favorites))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.storage_namespace, "tmv2");
    }

    #[test]
    fn toml_values_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://gigs.example"
            ipinfo_token = "  tok  "
            storage_namespace = "staging"
            data_dir = "/srv/gigsearch"
            request_timeout_secs = 3
            device_position = "41.8781, -87.6298"
            trace_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://gigs.example");
        assert_eq!(config.ipinfo_token.as_deref(), Some("tok"));
        assert_eq!(config.storage_namespace, "staging");
        assert_eq!(config.store_path(), PathBuf::from("/srv/gigsearch/state.json"));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.device_position, Some(Coordinates::new(41.8781, -87.6298)));
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(Config::from_toml_str("api_base_url = "), Err(GigsearchError::Config(_))));
        assert!(matches!(Config::from_toml_str("colour = \"blue\""), Err(GigsearchError::Config(_))));
        assert!(matches!(
            Config::from_toml_str("request_timeout_secs = \"ten\""),
            Err(GigsearchError::Config(_))
        ));
    }

    #[test]
    fn map_values_are_lenient() {
        let map: BTreeMap<String, String> = [
            ("ipinfo_token", "   "),
            ("request_timeout_secs", "0"),
            ("device_position", "north-ish"),
            ("storage_namespace", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(config.ipinfo_token, None);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.device_position, None);
        assert_eq!(config.storage_namespace, "tmv2");
    }

    #[test]
    fn config_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gigsearch.toml");
        std::fs::write(&path, "trace_level = \"warn\"\n").unwrap();
        assert_eq!(Config::from_file(&path).unwrap().trace_level.as_deref(), Some("warn"));
        assert!(matches!(Config::from_file(&dir.path().join("missing.toml")), Err(GigsearchError::Io(_))));
    }

    #[test]
    fn initialize_wires_a_session_on_disk() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: dir.path().join("nested"),
            ..Config::default()
        };
        let session = initialize(&config).unwrap();
        assert!(session.recent_searches().is_empty());
        assert!(session.favorites().is_empty());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn initialize_rejects_bad_urls() {
        let config = Config {
            api_base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(initialize(&config), Err(GigsearchError::Config(_))));
    }
}
