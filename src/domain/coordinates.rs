//! Latitude/longitude pairs and their `"lat,lon"` text form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A geographic position in decimal degrees.
///
/// The text form is `"lat,lon"` with each value printed in its shortest
/// round-trip decimal representation, so `34.05` stays `34.05` instead of
/// being rounded or padded.
///
/// ```
/// use gigsearch::domain::Coordinates;
///
/// let c = Coordinates::new(34.05, -118.24);
/// assert_eq!(c.to_string(), "34.05,-118.24");
/// assert_eq!("34.05, -118.24".parse::<Coordinates>().unwrap(), c);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parses a `"lat,lon"` string, returning `None` for anything else.
    ///
    /// Exactly two comma-separated parts are required, both finite numbers
    /// within the valid degree ranges.
    #[must_use]
    pub fn parse_pair(text: &str) -> Option<Self> {
        let mut parts = text.split(',').map(str::trim);
        let lat = parts.next()?.parse::<f64>().ok()?;
        let lon = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self::new(lat, lon))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Error returned when a string is not a `"lat,lon"` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a lat,lon pair: {0:?}")]
pub struct ParseCoordinatesError(pub String);

impl FromStr for Coordinates {
    type Err = ParseCoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_pair(s).ok_or_else(|| ParseCoordinatesError(s.to_string()))
    }
}
