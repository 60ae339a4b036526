//! Lenient projections of raw directory records.
//!
//! Event and venue records arrive in the upstream ticketing provider's shape,
//! which is deep and mostly optional. The projections here read only the
//! fields the app displays and tolerate anything missing or mistyped.

use crate::domain::MappedEvent;
use reqwest::Url;
use serde_json::Value;

/// Placeholder for venue fields the record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator between genre names.
const GENRE_SEPARATOR: &str = " | ";

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

const CLASSIFICATION_LEVELS: [&str; 5] = ["segment", "genre", "subGenre", "type", "subType"];

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn owned_at(value: &Value, pointer: &str) -> Option<String> {
    str_at(value, pointer).map(str::to_string)
}

/// `localDate localTime`, either alone if the other is missing.
fn date_time(event: &Value) -> String {
    [
        str_at(event, "/dates/start/localDate"),
        str_at(event, "/dates/start/localTime"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Genre names of the given classifications, deduplicated in order.
fn genres<'a>(classifications: impl Iterator<Item = &'a Value>) -> String {
    let mut names: Vec<&str> = Vec::new();
    for classification in classifications {
        for level in CLASSIFICATION_LEVELS {
            let Some(name) = str_at(classification, &format!("/{level}/name")) else {
                continue;
            };
            if !name.eq_ignore_ascii_case("undefined") && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names.join(GENRE_SEPARATOR)
}

fn classifications(event: &Value) -> &[Value] {
    event
        .get("classifications")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn first_venue_name(event: &Value) -> Option<String> {
    owned_at(event, "/_embedded/venues/0/name")
}

/// URL of the image with the smallest area. Missing dimensions count as 1.
fn smallest_image(event: &Value) -> String {
    let Some(images) = event.get("images").and_then(Value::as_array) else {
        return String::new();
    };
    images
        .iter()
        .filter_map(|image| {
            let url = image.get("url").and_then(Value::as_str)?;
            let width = image.get("width").and_then(Value::as_u64).unwrap_or(1);
            let height = image.get("height").and_then(Value::as_u64).unwrap_or(1);
            Some((width.saturating_mul(height), url))
        })
        .min_by_key(|(area, _)| *area)
        .map(|(_, url)| url.to_string())
        .unwrap_or_default()
}

/// Prints whole amounts without a fractional part, as the provider's own
/// pages do.
fn format_amount(value: &Value) -> Option<String> {
    if let Some(n) = value.as_i64() {
        return Some(n.to_string());
    }
    let n = value.as_f64()?;
    if n.fract() == 0.0 && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        return Some((n as i64).to_string());
    }
    Some(n.to_string())
}

/// Projects one raw search hit into a [`MappedEvent`].
///
/// Used when the directory returns the provider's raw `_embedded.events`
/// shape instead of pre-mapped events. Only the first classification feeds
/// the genre, and a missing genre or venue reads `"N/A"`.
#[must_use]
pub fn map_raw_event(event: &Value) -> MappedEvent {
    let genre = genres(classifications(event).iter().take(1));
    MappedEvent {
        id: owned_at(event, "/id").unwrap_or_default(),
        name: owned_at(event, "/name").unwrap_or_default(),
        date_time: date_time(event),
        genre: if genre.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            genre
        },
        venue: first_venue_name(event).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        icon: smallest_image(event),
    }
}

/// Sale status of an event's tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStatus {
    OnSale,
    OffSale,
    Canceled,
    Postponed,
    Rescheduled,
    Other(String),
}

impl TicketStatus {
    /// Maps the provider's status code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "onsale" => Self::OnSale,
            "offsale" => Self::OffSale,
            "canceled" | "cancelled" => Self::Canceled,
            "postponed" => Self::Postponed,
            "rescheduled" => Self::Rescheduled,
            _ => Self::Other(code.to_string()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::OnSale => "On Sale",
            Self::OffSale => "Off Sale",
            Self::Canceled => "Canceled",
            Self::Postponed => "Postponed",
            Self::Rescheduled => "Rescheduled",
            Self::Other(code) => code,
        }
    }
}

/// A performer or team appearing at an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
    pub url: Option<String>,
}

/// Display fields of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetail {
    pub id: String,
    pub name: String,
    /// `localDate localTime`; empty if the record has neither.
    pub date: String,
    pub artists: Vec<Artist>,
    pub venue: Option<String>,
    /// Every classification level across all classifications, joined with
    /// `" | "`. Empty if there are none.
    pub genres: String,
    pub price_range: Option<String>,
    pub ticket_status: Option<TicketStatus>,
    pub buy_url: Option<String>,
    pub seat_map_url: Option<String>,
    pub icon: String,
}

impl EventDetail {
    /// Projects a raw event record. Never fails; missing fields are empty or
    /// `None` and a missing name reads `"Event"`.
    ///
    /// ```
    /// use gigsearch::directory::EventDetail;
    /// use serde_json::json;
    ///
    /// let raw = json!({
    ///     "id": "E1",
    ///     "name": "Jazz Night",
    ///     "priceRanges": [{ "currency": "USD", "min": 25, "max": 80.5 }],
    ///     "dates": { "status": { "code": "onsale" } }
    /// });
    /// let detail = EventDetail::from_raw(&raw);
    /// assert_eq!(detail.price_range.as_deref(), Some("USD 25 - 80.5"));
    /// assert_eq!(detail.ticket_status.unwrap().label(), "On Sale");
    /// ```
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let artists = raw
            .pointer("/_embedded/attractions")
            .and_then(Value::as_array)
            .map(|attractions| {
                attractions
                    .iter()
                    .map(|a| Artist {
                        name: owned_at(a, "/name").unwrap_or_default(),
                        url: owned_at(a, "/url"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: owned_at(raw, "/id").unwrap_or_default(),
            name: owned_at(raw, "/name").unwrap_or_else(|| "Event".to_string()),
            date: date_time(raw),
            artists,
            venue: first_venue_name(raw),
            genres: genres(classifications(raw).iter()),
            price_range: price_range(raw),
            ticket_status: str_at(raw, "/dates/status/code").map(TicketStatus::from_code),
            buy_url: owned_at(raw, "/url"),
            seat_map_url: owned_at(raw, "/seatmap/staticUrl"),
            icon: smallest_image(raw),
        }
    }

    /// Artist names joined with `" | "`.
    #[must_use]
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(GENRE_SEPARATOR)
    }

    /// The event as a search hit, for saving it as a favorite from the detail
    /// view.
    #[must_use]
    pub fn favorite_snapshot(&self) -> MappedEvent {
        MappedEvent {
            id: self.id.clone(),
            name: self.name.clone(),
            date_time: self.date.clone(),
            genre: self.genres.clone(),
            venue: self.venue.clone().unwrap_or_default(),
            icon: self.icon.clone(),
        }
    }
}

/// `"CUR min - max"` from the first price range; either bound alone when the
/// other is missing.
fn price_range(raw: &Value) -> Option<String> {
    let range = raw.pointer("/priceRanges/0")?;
    let min = range.get("min").and_then(format_amount);
    let max = range.get("max").and_then(format_amount);
    let amount = match (min, max) {
        (Some(min), Some(max)) => format!("{min} - {max}"),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => return None,
    };
    Some(match str_at(range, "/currency") {
        Some(currency) => format!("{currency} {amount}"),
        None => amount,
    })
}

/// Display fields of one venue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueDetail {
    pub name: String,
    pub address: String,
    /// `"City, ST"`, or whichever part is present.
    pub city_state: String,
    pub postal_code: String,
    pub upcoming_events_url: Option<String>,
    pub maps_url: String,
}

impl VenueDetail {
    /// Projects the first venue of a raw venue search response.
    ///
    /// Returns `None` when the response holds no venue.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let venue = raw.pointer("/_embedded/venues/0").filter(|v| v.is_object())?;

        let name = owned_at(venue, "/name").unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let address = owned_at(venue, "/address/line1").unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let postal_code = owned_at(venue, "/postalCode").unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let city = str_at(venue, "/city/name");
        let state = str_at(venue, "/state/stateCode");

        let city_state = [city, state].into_iter().flatten().collect::<Vec<_>>().join(", ");
        let query = [Some(name.as_str()), Some(address.as_str()), city, state, Some(postal_code.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        let maps_url = Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", query.as_str())])
            .map_or_else(|_| MAPS_SEARCH_URL.to_string(), String::from);

        Some(Self {
            upcoming_events_url: owned_at(venue, "/url"),
            name,
            address,
            city_state,
            postal_code,
            maps_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_event() -> Value {
        json!({
            "id": "G5vYZ9",
            "name": "Chicago Jazz Orchestra",
            "url": "https://tickets.example/e/G5vYZ9",
            "dates": {
                "start": { "localDate": "2026-11-02", "localTime": "19:30:00" },
                "status": { "code": "offsale" }
            },
            "classifications": [
                { "segment": { "name": "Music" }, "genre": { "name": "Jazz" }, "subGenre": { "name": "Undefined" } },
                { "segment": { "name": "Music" }, "genre": { "name": " Big Band " }, "type": { "name": "" } }
            ],
            "priceRanges": [{ "currency": "USD", "min": 35.0 }],
            "seatmap": { "staticUrl": "https://maps.example/seat.png" },
            "images": [
                { "url": "https://img.example/big.jpg", "width": 1024, "height": 576 },
                { "url": "https://img.example/small.jpg", "width": 100, "height": 56 }
            ],
            "_embedded": {
                "venues": [{ "name": "Symphony Center" }],
                "attractions": [
                    { "name": "CJO", "url": "https://artists.example/cjo" },
                    { "name": "Guest" }
                ]
            }
        })
    }

    #[test]
    fn event_detail_reads_every_field() {
        let detail = EventDetail::from_raw(&raw_event());
        assert_eq!(detail.date, "2026-11-02 19:30:00");
        assert_eq!(detail.genres, "Music | Jazz | Big Band");
        assert_eq!(detail.price_range.as_deref(), Some("USD 35"));
        assert_eq!(detail.ticket_status, Some(TicketStatus::OffSale));
        assert_eq!(detail.venue.as_deref(), Some("Symphony Center"));
        assert_eq!(detail.artist_line(), "CJO | Guest");
        assert_eq!(detail.artists[1].url, None);
        assert_eq!(detail.seat_map_url.as_deref(), Some("https://maps.example/seat.png"));
        assert_eq!(detail.icon, "https://img.example/small.jpg");
    }

    #[test]
    fn event_detail_tolerates_empty_record() {
        let detail = EventDetail::from_raw(&json!({}));
        assert_eq!(detail.name, "Event");
        assert!(detail.date.is_empty());
        assert!(detail.artists.is_empty());
        assert_eq!(detail.price_range, None);
        assert_eq!(detail.ticket_status, None);
    }

    #[test]
    fn snapshot_copies_display_fields() {
        let snapshot = EventDetail::from_raw(&raw_event()).favorite_snapshot();
        assert_eq!(snapshot.id, "G5vYZ9");
        assert_eq!(snapshot.date_time, "2026-11-02 19:30:00");
        assert_eq!(snapshot.venue, "Symphony Center");
    }

    #[test]
    fn raw_search_hit_uses_first_classification() {
        let mapped = map_raw_event(&raw_event());
        assert_eq!(mapped.genre, "Music | Jazz");
        assert_eq!(mapped.icon, "https://img.example/small.jpg");

        let bare = map_raw_event(&json!({ "id": "X" }));
        assert_eq!(bare.genre, "N/A");
        assert_eq!(bare.venue, "N/A");
    }

    #[test]
    fn unknown_status_keeps_code() {
        assert_eq!(TicketStatus::from_code("ONSALE"), TicketStatus::OnSale);
        assert_eq!(TicketStatus::from_code("presale").label(), "presale");
    }

    #[test]
    fn venue_detail_defaults_and_maps_link() {
        let raw = json!({
            "_embedded": { "venues": [{
                "name": "Green Mill",
                "city": { "name": "Chicago" },
                "state": { "stateCode": "IL" },
                "url": "https://venues.example/green-mill"
            }]}
        });
        let venue = VenueDetail::from_raw(&raw).unwrap();
        assert_eq!(venue.address, "N/A");
        assert_eq!(venue.postal_code, "N/A");
        assert_eq!(venue.city_state, "Chicago, IL");
        assert!(venue.maps_url.starts_with("https://www.google.com/maps/search/?api=1&query="));
        assert!(venue.maps_url.contains("Green+Mill%2C+N%2FA%2C+Chicago%2C+IL"));

        assert!(VenueDetail::from_raw(&json!({ "_embedded": { "venues": [] } })).is_none());
        assert!(VenueDetail::from_raw(&json!({})).is_none());
    }
}
