//! Event directory client.
//!
//! The event directory is the backend service that fronts the upstream
//! ticketing provider. It searches events near a location, returns raw event
//! and venue records, and reverse-geocodes coordinates. This module defines the
//! [`EventDirectory`] trait the rest of the crate talks to, an HTTP
//! implementation, and projections of the raw records it returns.
//!
//! # Modules
//!
//! - `http`: [`HttpEventDirectory`], the `reqwest` binding
//! - `detail`: [`EventDetail`] and [`VenueDetail`] projections

pub mod detail;
pub mod http;

pub use detail::{map_raw_event, Artist, EventDetail, TicketStatus, VenueDetail};
pub use http::HttpEventDirectory;

use crate::domain::error::Result;
use crate::domain::{Coordinates, MappedEvent, SearchParams};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Human-readable names for a coordinate pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReverseGeocode {
    /// Short place name such as `"Los Angeles, CA"`.
    pub location: Option<String>,
    /// Full postal address.
    pub formatted_address: Option<String>,
}

impl ReverseGeocode {
    /// The best non-blank name, preferring the short place name.
    #[must_use]
    pub fn best_name(&self) -> Option<&str> {
        [self.location.as_deref(), self.formatted_address.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

/// Operations of the event directory service.
///
/// Implementations should treat a non-success response as an error. Callers
/// degrade errors to empty results or a message; none of them is fatal.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    /// Events matching `params`, in the directory's order.
    async fn search(&self, params: &SearchParams) -> Result<Vec<MappedEvent>>;

    /// The raw event record for `id`.
    async fn event_detail(&self, id: &str) -> Result<Value>;

    /// The raw venue search response for `keyword`.
    async fn venue(&self, keyword: &str) -> Result<Value>;

    /// Place names for `coordinates`.
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<ReverseGeocode>;

    /// Liveness probe. Directories without one report healthy.
    async fn health(&self) -> Result<Value> {
        Ok(serde_json::json!({ "status": "ok" }))
    }
}

/// Extracts events from a search response body.
///
/// Accepts the mapped `{ "events": [...] }` shape and the provider's raw
/// `{ "_embedded": { "events": [...] } }` shape. A body with neither means no
/// events. A body that is not an object is an error.
///
/// # Errors
///
/// Returns [`GigsearchError::Directory`](crate::GigsearchError::Directory) if
/// the body is not a JSON object or `events` is not a list of events.
pub fn decode_search_response(body: Value) -> Result<Vec<MappedEvent>> {
    use crate::domain::error::GigsearchError;

    let Value::Object(mut body) = body else {
        return Err(GigsearchError::Directory(
            "search response is not an object".to_string(),
        ));
    };

    if let Some(events) = body.remove("events") {
        return serde_json::from_value(events)
            .map_err(|e| GigsearchError::Directory(format!("malformed events list: {e}")));
    }

    let raw = body
        .get("_embedded")
        .and_then(|embedded| embedded.get("events"))
        .and_then(Value::as_array);
    Ok(raw.map_or_else(Vec::new, |events| events.iter().map(map_raw_event).collect()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_mapped_shape() {
        let body = json!({ "events": [{ "id": "E1", "name": "Jazz", "dateTime": "2026-01-01" }] });
        let events = decode_search_response(body).unwrap();
        assert_eq!(events[0].date_time, "2026-01-01");
        assert_eq!(events[0].venue, "");
    }

    #[test]
    fn decodes_raw_embedded_shape() {
        let body = json!({ "_embedded": { "events": [{ "id": "E2", "name": "Rock" }] } });
        let events = decode_search_response(body).unwrap();
        assert_eq!(events[0].id, "E2");
        assert_eq!(events[0].venue, "N/A");
    }

    #[test]
    fn missing_events_is_empty_and_non_object_is_error() {
        assert!(decode_search_response(json!({ "page": {} })).unwrap().is_empty());
        assert!(decode_search_response(json!([1])).is_err());
        assert!(decode_search_response(json!({ "events": "nope" })).is_err());
    }

    #[test]
    fn reverse_geocode_prefers_short_name() {
        let both = ReverseGeocode {
            location: Some("  ".to_string()),
            formatted_address: Some("200 N Spring St, Los Angeles, CA".to_string()),
        };
        assert_eq!(both.best_name(), Some("200 N Spring St, Los Angeles, CA"));
        assert_eq!(ReverseGeocode::default().best_name(), None);
    }
}
