//! Location resolution for searches.
//!
//! A search needs a location string the event directory understands: a place
//! name like `"Chicago, IL"` or a raw `"lat,lon"` pair. When the user asks for
//! auto-detection the resolver walks a fixed fallback chain:
//!
//! ```text
//! TryTokenLookup ──place──────────────────────────────▶ Place
//!      │ └──────coordinates only──┐
//!      ▼ nothing                  ▼
//! TryDeviceGeolocation ──fix──▶ TryReverseGeocode ──name──▶ ReverseGeocoded
//!      │ denied / timeout               └──failure──▶ Coordinates
//!      ▼
//!    Failed
//! ```
//!
//! Steps run strictly one after another. An empty resolution is never a
//! usable location; callers turn it into a prompt.

use super::geolocation::{DeviceGeolocation, PositionOptions};
use super::ipinfo::{decode_lenient, IpInfo, IpLookup};
use crate::directory::EventDirectory;
use crate::domain::Coordinates;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Message shown when auto-detection finds nothing.
pub const LOCATION_UNAVAILABLE: &str = "Failed to determine location. Enter city or use current location.";

/// Outcome of one resolution, with how it was obtained.
///
/// ```
/// use gigsearch::domain::Coordinates;
/// use gigsearch::location::Resolution;
///
/// assert_eq!(Resolution::Coordinates(Coordinates::new(34.05, -118.24)).location(), "34.05,-118.24");
/// assert!(!Resolution::Explicit("   ".trim().to_string()).is_resolved());
/// assert_eq!(Resolution::Failed.location(), "");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The user's own text, trimmed.
    Explicit(String),
    /// Place name from the IP lookup.
    Place(String),
    /// Name the directory gave for a coordinate pair.
    ReverseGeocoded(String),
    /// A coordinate pair nobody could name.
    Coordinates(Coordinates),
    Failed,
}

impl Resolution {
    /// The location string to search with; empty for [`Resolution::Failed`].
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Explicit(text) | Self::Place(text) | Self::ReverseGeocoded(text) => text.clone(),
            Self::Coordinates(coordinates) => coordinates.to_string(),
            Self::Failed => String::new(),
        }
    }

    /// True when there is a non-empty location to search with.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.location().is_empty()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

enum Step {
    TryTokenLookup,
    TryDeviceGeolocation,
    TryReverseGeocode(Coordinates),
    Done(Resolution),
}

/// IP lookup source plus the token it needs.
#[derive(Clone)]
pub struct TokenLookup {
    pub source: Arc<dyn IpLookup>,
    pub token: String,
}

/// Resolves the location for a search.
///
/// Holds the optional IP lookup, the device position source, and the event
/// directory used for reverse geocoding. Concurrent calls do not coordinate;
/// each walks the chain on its own.
pub struct LocationResolver {
    token_lookup: Option<TokenLookup>,
    device: Arc<dyn DeviceGeolocation>,
    directory: Arc<dyn EventDirectory>,
    options: PositionOptions,
}

impl fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationResolver")
            .field("token_lookup", &self.token_lookup.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl LocationResolver {
    /// Creates a resolver. A lookup with a blank token is treated as absent.
    pub fn new(
        token_lookup: Option<TokenLookup>,
        device: Arc<dyn DeviceGeolocation>,
        directory: Arc<dyn EventDirectory>,
    ) -> Self {
        Self {
            token_lookup: token_lookup.filter(|lookup| !lookup.token.trim().is_empty()),
            device,
            directory,
            options: PositionOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves to a location string; empty means failure.
    pub async fn resolve(&self, explicit: Option<&str>, auto_detect: bool) -> String {
        self.resolve_detailed(explicit, auto_detect).await.location()
    }

    /// Resolves and reports which step produced the location.
    ///
    /// Without auto-detect the trimmed explicit text is returned and nothing
    /// is queried.
    pub async fn resolve_detailed(&self, explicit: Option<&str>, auto_detect: bool) -> Resolution {
        if !auto_detect {
            return Resolution::Explicit(explicit.unwrap_or_default().trim().to_string());
        }

        let mut step = Step::TryTokenLookup;
        loop {
            step = match step {
                Step::TryTokenLookup => self.try_token_lookup().await,
                Step::TryDeviceGeolocation => self.try_device().await,
                Step::TryReverseGeocode(coordinates) => self.try_reverse_geocode(coordinates).await,
                Step::Done(resolution) => {
                    tracing::info!(location = %resolution, "location resolved");
                    return resolution;
                }
            };
        }
    }

    async fn try_token_lookup(&self) -> Step {
        let Some(lookup) = &self.token_lookup else {
            return Step::TryDeviceGeolocation;
        };
        let body = match lookup
            .source
            .lookup(&lookup.token)
            .instrument(tracing::debug_span!("ip_lookup"))
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "IP lookup failed");
                return Step::TryDeviceGeolocation;
            }
        };
        let Some(info) = decode_lenient::<IpInfo>(&body) else {
            tracing::debug!("IP lookup response did not decode");
            return Step::TryDeviceGeolocation;
        };

        if let Some(place) = info.place_name() {
            return Step::Done(Resolution::Place(place));
        }
        match info.coordinates() {
            Some(coordinates) => Step::TryReverseGeocode(coordinates),
            None => Step::TryDeviceGeolocation,
        }
    }

    async fn try_device(&self) -> Step {
        let request = self.device.current_position(&self.options);
        match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(coordinates)) => Step::TryReverseGeocode(coordinates),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "device geolocation failed");
                Step::Done(Resolution::Failed)
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.options.timeout, "device geolocation timed out");
                Step::Done(Resolution::Failed)
            }
        }
    }

    async fn try_reverse_geocode(&self, coordinates: Coordinates) -> Step {
        let resolution = match self.directory.reverse_geocode(coordinates).await {
            Ok(geocode) => geocode.best_name().map_or(
                Resolution::Coordinates(coordinates),
                |name| Resolution::ReverseGeocoded(name.to_string()),
            ),
            Err(e) => {
                tracing::debug!(error = %e, %coordinates, "reverse geocoding failed, using raw coordinates");
                Resolution::Coordinates(coordinates)
            }
        };
        Step::Done(resolution)
    }
}
