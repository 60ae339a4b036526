//! Event records shared by search results and favorites.
//!
//! [`MappedEvent`] is the normalized projection the event directory produces for
//! each search hit. [`FavoriteEvent`] is the snapshot stored when the user saves
//! one of those events; it is a separate type so that a stored favorite can never
//! alias the live record it was copied from.

use serde::{Deserialize, Serialize};

/// One search hit as returned by the event directory.
///
/// Field names follow the directory's camelCase wire format (`dateTime`).
/// Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappedEvent {
    pub id: String,
    pub name: String,
    pub date_time: String,
    pub genre: String,
    pub venue: String,
    pub icon: String,
}

impl MappedEvent {
    /// Date/time text for display, `"TBA"` when the directory had none.
    #[must_use]
    pub fn date_time_or_tba(&self) -> &str {
        if self.date_time.is_empty() {
            "TBA"
        } else {
            &self.date_time
        }
    }
}

/// A saved event, denormalized at the moment it was favorited.
///
/// Later changes to the [`MappedEvent`] it came from do not reach this copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FavoriteEvent {
    pub id: String,
    pub name: String,
    pub date_time: String,
    pub genre: String,
    pub venue: String,
    pub icon: String,
}

impl From<&MappedEvent> for FavoriteEvent {
    fn from(event: &MappedEvent) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            date_time: event.date_time.clone(),
            genre: event.genre.clone(),
            venue: event.venue.clone(),
            icon: event.icon.clone(),
        }
    }
}

impl From<FavoriteEvent> for MappedEvent {
    fn from(favorite: FavoriteEvent) -> Self {
        Self {
            id: favorite.id,
            name: favorite.name,
            date_time: favorite.date_time,
            genre: favorite.genre,
            venue: favorite.venue,
            icon: favorite.icon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_event_uses_camel_case_on_the_wire() {
        let json = r#"{"id":"G5v","name":"Jazz Night","dateTime":"2026-11-02 20:00:00","genre":"Music | Jazz","venue":"Green Mill","icon":"https://img/1.jpg"}"#;
        let event: MappedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.date_time, "2026-11-02 20:00:00");
        assert!(serde_json::to_string(&event).unwrap().contains("\"dateTime\""));
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let event: MappedEvent = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(event.name, "");
        assert_eq!(event.date_time_or_tba(), "TBA");
    }

    #[test]
    fn favorite_is_a_detached_copy() {
        let mut live = MappedEvent {
            id: "e1".into(),
            name: "Before".into(),
            ..MappedEvent::default()
        };
        let favorite = FavoriteEvent::from(&live);
        live.name = "After".into();
        assert_eq!(favorite.name, "Before");
    }
}
