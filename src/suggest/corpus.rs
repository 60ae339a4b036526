//! Static keyword tables.
//!
//! These lists are curated by hand and ship with the binary. They seed the
//! suggestion dropdown before the user has any history and drive the
//! "related searches" shown under a result set.

/// Popular search terms, in display order.
pub const POPULAR_KEYWORDS: [&str; 8] = [
    "Taylor Swift",
    "NBA",
    "Concert",
    "Theatre",
    "Comedy",
    "Jazz",
    "Rock",
    "Festival",
];

/// Related terms for each popular keyword. Lookup walks the table in order
/// and the first matching row wins.
pub const RELATED_KEYWORDS: [(&str, [&str; 4]); 8] = [
    ("Taylor Swift", ["Concert", "Pop Music", "Arena Tour", "Music Festival"]),
    ("NBA", ["Basketball", "Sports", "Basketball Game", "Professional Sports"]),
    ("Concert", ["Music", "Live Music", "Performance", "Entertainment"]),
    ("Theatre", ["Broadway", "Drama", "Musical", "Performance"]),
    ("Comedy", ["Stand-up", "Comedy Show", "Entertainment", "Laugh"]),
    ("Jazz", ["Music", "Jazz Concert", "Live Music", "Blues"]),
    ("Rock", ["Rock Concert", "Music", "Live Music", "Concert"]),
    ("Festival", ["Music Festival", "Outdoor", "Concert", "Event"]),
];

/// Related terms used when no row of [`RELATED_KEYWORDS`] matches.
pub const DEFAULT_RELATED: [&str; 4] = ["Concert", "Music", "Event", "Entertainment"];

/// Related terms for `keyword`, case-insensitively.
///
/// A row matches when either its key or `keyword` contains the other. Returns
/// [`DEFAULT_RELATED`] when nothing matches.
#[must_use]
pub fn related_to(keyword: &str) -> &'static [&'static str; 4] {
    let needle = keyword.to_lowercase();
    RELATED_KEYWORDS
        .iter()
        .find(|(key, _)| {
            let key = key.to_lowercase();
            needle.contains(&key) || key.contains(&needle)
        })
        .map_or(&DEFAULT_RELATED, |(_, related)| related)
}
