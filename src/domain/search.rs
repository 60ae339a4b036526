//! Search parameter types.
//!
//! A search is identified by the tuple (keyword, location, category, radius).
//! [`SearchParams`] is that tuple on its own, [`RecentSearch`] is the tuple plus
//! the time it was last submitted, and [`SearchForm`] is what the user filled in
//! before the location was resolved.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius sent when the form leaves it blank, in miles.
pub const DEFAULT_RADIUS: &str = "10";

/// Category value meaning "all categories".
pub const DEFAULT_CATEGORY: &str = "default";

/// Number of milliseconds in one minute.
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Number of milliseconds in one hour.
const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Number of milliseconds in one day.
const MILLIS_PER_DAY: i64 = 86_400_000;

/// The identity key of a search.
///
/// Two searches are the same search when all four fields are byte-for-byte
/// equal. No trimming or case folding happens here; callers normalize input
/// before building params.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchParams {
    pub keyword: String,
    pub radius: String,
    pub category: String,
    pub location: String,
}

impl SearchParams {
    pub fn new(
        keyword: impl Into<String>,
        radius: impl Into<String>,
        category: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            radius: radius.into(),
            category: category.into(),
            location: location.into(),
        }
    }

    /// Radius to send to the directory, falling back to [`DEFAULT_RADIUS`].
    #[must_use]
    pub fn effective_radius(&self) -> &str {
        if self.radius.trim().is_empty() {
            DEFAULT_RADIUS
        } else {
            self.radius.trim()
        }
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} near {} ({} mi, {})",
            self.keyword,
            self.location,
            self.effective_radius(),
            Category::label_for(&self.category)
        )
    }
}

/// A previously submitted search, as kept by the recency store.
///
/// The timestamp is Unix milliseconds. It is serialized as `ts` to stay
/// readable by older clients that wrote the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub keyword: String,
    pub location: String,
    pub category: String,
    pub radius: String,
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: i64,
}

impl RecentSearch {
    /// Creates an entry from params, stamped with the given time.
    #[must_use]
    pub fn from_params(params: &SearchParams, timestamp: i64) -> Self {
        Self {
            keyword: params.keyword.clone(),
            location: params.location.clone(),
            category: params.category.clone(),
            radius: params.radius.clone(),
            timestamp,
        }
    }

    /// Returns the identity key of this entry.
    #[must_use]
    pub fn params(&self) -> SearchParams {
        SearchParams {
            keyword: self.keyword.clone(),
            radius: self.radius.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
        }
    }

    /// True when both entries describe the same search, ignoring timestamps.
    #[must_use]
    pub fn same_search(&self, other: &Self) -> bool {
        self.keyword == other.keyword
            && self.location == other.location
            && self.category == other.category
            && self.radius == other.radius
    }

    /// Human-readable age of this entry relative to `now` (Unix millis).
    ///
    /// - Less than 1 minute: "just now"
    /// - Less than 1 hour: "Xm ago"
    /// - Less than 1 day: "Xh ago"
    /// - Otherwise: "Xd ago"
    ///
    /// ```
    /// use gigsearch::domain::{RecentSearch, SearchParams};
    ///
    /// let params = SearchParams::new("jazz", "25", "default", "Chicago, IL");
    /// let entry = RecentSearch::from_params(&params, 1_000_000);
    /// assert_eq!(entry.time_ago(1_000_000 + 5 * 60_000), "5m ago");
    /// ```
    #[must_use]
    pub fn time_ago(&self, now: i64) -> String {
        let diff = now - self.timestamp;

        if diff < MILLIS_PER_MINUTE {
            "just now".to_string()
        } else if diff < MILLIS_PER_HOUR {
            format!("{}m ago", diff / MILLIS_PER_MINUTE)
        } else if diff < MILLIS_PER_DAY {
            format!("{}h ago", diff / MILLIS_PER_HOUR)
        } else {
            format!("{}d ago", diff / MILLIS_PER_DAY)
        }
    }
}

/// Event categories offered by the search form.
///
/// Each non-default category maps to an upstream segment id. Stored searches
/// keep the raw segment id string, so unknown ids survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Default,
    Music,
    Sports,
    ArtsTheatre,
    Film,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Self; 6] = [
        Self::Default,
        Self::Music,
        Self::Sports,
        Self::ArtsTheatre,
        Self::Film,
        Self::Miscellaneous,
    ];

    /// The segment id sent to the directory.
    #[must_use]
    pub const fn segment_id(self) -> &'static str {
        match self {
            Self::Default => DEFAULT_CATEGORY,
            Self::Music => "KZFzniwnSyZfZ7v7nJ",
            Self::Sports => "KZFzniwnSyZfZ7v7nE",
            Self::ArtsTheatre => "KZFzniwnSyZfZ7v7na",
            Self::Film => "KZFzniwnSyZfZ7v7nn",
            Self::Miscellaneous => "KZFzniwnSyZfZ7v7n1",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Music => "Music",
            Self::Sports => "Sports",
            Self::ArtsTheatre => "Arts & Theatre",
            Self::Film => "Film",
            Self::Miscellaneous => "Miscellaneous",
        }
    }

    /// Looks up a category by segment id. Matching is exact except for the
    /// default sentinel, which is case-insensitive.
    #[must_use]
    pub fn from_segment_id(segment_id: &str) -> Option<Self> {
        if segment_id.eq_ignore_ascii_case(DEFAULT_CATEGORY) {
            return Some(Self::Default);
        }
        Self::ALL
            .into_iter()
            .find(|category| category.segment_id() == segment_id)
    }

    /// Parses either a segment id or a label/short name such as `music` or
    /// `arts`. Used by the command line front end.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::from_segment_id(value).or_else(|| match value.to_lowercase().as_str() {
            "music" => Some(Self::Music),
            "sports" => Some(Self::Sports),
            "arts" | "theatre" | "arts & theatre" | "arts-theatre" => Some(Self::ArtsTheatre),
            "film" => Some(Self::Film),
            "misc" | "miscellaneous" => Some(Self::Miscellaneous),
            "" | "all" => Some(Self::Default),
            _ => None,
        })
    }

    /// Display label for a stored segment id, or the id itself if unknown.
    #[must_use]
    pub fn label_for(segment_id: &str) -> &str {
        Self::from_segment_id(segment_id).map_or(segment_id, |category| category.label())
    }
}

/// The search form as the user filled it in.
///
/// `location` is ignored when `auto_detect` is set and the resolver finds
/// something; it is still passed along so the resolver can fall back to it
/// being empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub keyword: String,
    pub radius: String,
    pub category: String,
    pub location: String,
    pub auto_detect: bool,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            radius: DEFAULT_RADIUS.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            location: String::new(),
            auto_detect: false,
        }
    }
}

impl SearchForm {
    /// Builds the identity key for this form once a location is known.
    ///
    /// Keyword is trimmed, a blank radius becomes [`DEFAULT_RADIUS`] and a
    /// blank category becomes [`DEFAULT_CATEGORY`].
    #[must_use]
    pub fn to_params(&self, location: &str) -> SearchParams {
        let radius = self.radius.trim();
        let category = self.category.trim();
        SearchParams {
            keyword: self.keyword.trim().to_string(),
            radius: (if radius.is_empty() { DEFAULT_RADIUS } else { radius }).to_string(),
            category: (if category.is_empty() { DEFAULT_CATEGORY } else { category }).to_string(),
            location: location.trim().to_string(),
        }
    }

    /// A form is submittable once it has a keyword and either a typed
    /// location or auto-detect turned on.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.keyword.trim().is_empty() && (self.auto_detect || !self.location.trim().is_empty())
    }

    /// Refills the whole form from a recent search, as selecting a full
    /// recent-search suggestion does.
    pub fn fill_from(&mut self, recent: &RecentSearch) {
        self.keyword.clone_from(&recent.keyword);
        self.location.clone_from(&recent.location);
        self.category.clone_from(&recent.category);
        self.radius.clone_from(&recent.radius);
        self.auto_detect = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_search_reads_legacy_ts_field() {
        let json = r#"{"keyword":"jazz","location":"Chicago, IL","category":"default","radius":"25","ts":1700000000000}"#;
        let entry: RecentSearch = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp, 1_700_000_000_000);

        let written = serde_json::to_string(&entry).unwrap();
        assert!(written.contains("\"ts\":1700000000000"));
    }

    #[test]
    fn recent_search_accepts_timestamp_alias() {
        let json = r#"{"keyword":"k","location":"l","category":"c","radius":"r","timestamp":5}"#;
        let entry: RecentSearch = serde_json::from_str(json).unwrap();
        assert_eq!(entry.timestamp, 5);
    }

    #[test]
    fn identity_ignores_timestamp() {
        let params = SearchParams::new("jazz", "25", "default", "Chicago, IL");
        let a = RecentSearch::from_params(&params, 1);
        let b = RecentSearch::from_params(&params, 2);
        assert!(a.same_search(&b));
        assert_eq!(a.params(), params);
    }

    #[test]
    fn form_defaults_blank_radius_and_category() {
        let form = SearchForm {
            keyword: "  rock ".into(),
            radius: " ".into(),
            category: String::new(),
            ..SearchForm::default()
        };
        let params = form.to_params(" Austin, TX ");
        assert_eq!(params, SearchParams::new("rock", "10", "default", "Austin, TX"));
    }

    #[test]
    fn form_needs_keyword_and_location_source() {
        let mut form = SearchForm {
            keyword: "nba".into(),
            ..SearchForm::default()
        };
        assert!(!form.is_submittable());
        form.auto_detect = true;
        assert!(form.is_submittable());
        form.keyword = "   ".into();
        assert!(!form.is_submittable());
    }

    #[test]
    fn category_lookup_by_id_and_name() {
        assert_eq!(Category::from_segment_id("KZFzniwnSyZfZ7v7nE"), Some(Category::Sports));
        assert_eq!(Category::from_segment_id("DEFAULT"), Some(Category::Default));
        assert_eq!(Category::parse("arts"), Some(Category::ArtsTheatre));
        assert_eq!(Category::parse("opera"), None);
        assert_eq!(Category::label_for("unknown-id"), "unknown-id");
    }

    #[test]
    fn label_for_borrows_stored_ids() {
        let stored = String::from("KZFzniwnSyZfZ7v7nJ");
        assert_eq!(Category::label_for(&stored), "Music");
        let custom = format!("segment-{}", 42);
        assert_eq!(Category::label_for(&custom), "segment-42");
    }

    #[test]
    fn time_ago_buckets() {
        let entry = RecentSearch::from_params(&SearchParams::default(), 0);
        assert_eq!(entry.time_ago(59_999), "just now");
        assert_eq!(entry.time_ago(3 * MILLIS_PER_HOUR), "3h ago");
        assert_eq!(entry.time_ago(8 * MILLIS_PER_DAY), "8d ago");
    }
}
