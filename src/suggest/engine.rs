//! Keystroke-time suggestion ranking.

use super::corpus::POPULAR_KEYWORDS;
use crate::domain::RecentSearch;
use crate::storage::recent::distinct_keywords;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Maximum items in any one group.
pub const GROUP_LIMIT: usize = 5;

/// A keyword the user can pick to fill the keyword field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSuggestion {
    pub keyword: String,

    /// `(start, end)` character ranges of `keyword` matched by the prefix,
    /// end exclusive. Empty when the prefix is empty.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// Where a keyword group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSource {
    /// Curated popular terms, shown before the user has any history.
    Popular,
    /// Recent and popular keywords containing the typed prefix.
    Matching,
}

/// One section of the suggestion dropdown, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionGroup {
    /// Past searches whose keyword or location contains the prefix. Picking
    /// one refills the whole form.
    RecentSearches(Vec<RecentSearch>),
    Keywords {
        source: KeywordSource,
        items: Vec<KeywordSuggestion>,
    },
    /// Bare keywords from history.
    RecentKeywords(Vec<KeywordSuggestion>),
}

impl SuggestionGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::RecentSearches(items) => items.len(),
            Self::Keywords { items, .. } | Self::RecentKeywords(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keyword text of every item, for display and tests.
    #[must_use]
    pub fn keywords(&self) -> Vec<&str> {
        match self {
            Self::RecentSearches(items) => items.iter().map(|r| r.keyword.as_str()).collect(),
            Self::Keywords { items, .. } | Self::RecentKeywords(items) => {
                items.iter().map(|k| k.keyword.as_str()).collect()
            }
        }
    }
}

/// Ranks suggestions for the keyword field.
///
/// Stateless apart from the matcher; results are recomputed from the recent
/// list on every call.
///
/// # Examples
///
/// ```
/// use gigsearch::suggest::{SuggestionEngine, SuggestionGroup};
///
/// let engine = SuggestionEngine::new();
/// let groups = engine.suggest("tay", &[]).unwrap();
/// assert!(groups[0].keywords().contains(&"Taylor Swift"));
/// ```
pub struct SuggestionEngine {
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionEngine").finish_non_exhaustive()
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Suggestions for `prefix` given the recent searches, newest first.
    ///
    /// Group order is recent full searches, then matching keywords (recent
    /// ones first, then popular ones), then recent bare keywords. The last
    /// group ignores the prefix and only appears when nothing else did. An
    /// empty prefix shows popular terms to a user without history and their
    /// recent keywords otherwise. Returns `None` when every group is empty.
    #[must_use]
    pub fn suggest(&self, prefix: &str, recent: &[RecentSearch]) -> Option<Vec<SuggestionGroup>> {
        let _span = tracing::trace_span!("suggest", prefix = %prefix).entered();

        let typed = prefix.trim();
        let needle = typed.to_lowercase();
        let is_candidate = |keyword: &str| {
            let lower = keyword.to_lowercase();
            lower.contains(&needle) && lower != needle
        };

        let all_recent_keywords = distinct_keywords(recent);
        let mut groups = Vec::new();

        if typed.is_empty() {
            let recent_keywords: Vec<&str> = all_recent_keywords.into_iter().take(GROUP_LIMIT).collect();
            if recent_keywords.is_empty() {
                groups.push(SuggestionGroup::Keywords {
                    source: KeywordSource::Popular,
                    items: self.keyword_items(POPULAR_KEYWORDS.iter().copied().take(GROUP_LIMIT), typed),
                });
            } else {
                groups.push(SuggestionGroup::RecentKeywords(
                    self.keyword_items(recent_keywords.into_iter(), typed),
                ));
            }
            return Some(groups);
        }

        let searches: Vec<RecentSearch> = recent
            .iter()
            .filter(|r| {
                r.keyword.to_lowercase().contains(&needle) || r.location.to_lowercase().contains(&needle)
            })
            .take(GROUP_LIMIT)
            .cloned()
            .collect();
        if !searches.is_empty() {
            groups.push(SuggestionGroup::RecentSearches(searches));
        }

        let mut matching: Vec<&str> = Vec::new();
        for keyword in all_recent_keywords
            .iter()
            .copied()
            .chain(POPULAR_KEYWORDS.iter().copied())
            .filter(|k| is_candidate(k))
        {
            if matching.len() == GROUP_LIMIT {
                break;
            }
            if !matching.iter().any(|m| m.eq_ignore_ascii_case(keyword)) {
                matching.push(keyword);
            }
        }
        if !matching.is_empty() {
            groups.push(SuggestionGroup::Keywords {
                source: KeywordSource::Matching,
                items: self.keyword_items(matching.into_iter(), typed),
            });
        }

        if groups.is_empty() && !all_recent_keywords.is_empty() {
            groups.push(SuggestionGroup::RecentKeywords(
                self.keyword_items(all_recent_keywords.into_iter().take(GROUP_LIMIT), typed),
            ));
        }

        tracing::trace!(groups = groups.len(), "suggestions ranked");
        (!groups.is_empty()).then_some(groups)
    }

    fn keyword_items<'a>(&self, keywords: impl Iterator<Item = &'a str>, typed: &str) -> Vec<KeywordSuggestion> {
        keywords
            .map(|keyword| KeywordSuggestion {
                keyword: keyword.to_string(),
                highlight_ranges: self.highlight_ranges(keyword, typed),
            })
            .collect()
    }

    /// Character ranges of `text` matched by `query`.
    ///
    /// Matched indices from the Skim matcher are coalesced into contiguous
    /// `(start, end)` runs with an exclusive end.
    fn highlight_ranges(&self, text: &str, query: &str) -> Vec<(usize, usize)> {
        if query.is_empty() {
            return Vec::new();
        }
        let Some((_score, indices)) = self.matcher.fuzzy_indices(text, query) else {
            return Vec::new();
        };

        let mut ranges = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for idx in indices {
            run = match run {
                Some((start, end)) if idx == end => Some((start, idx + 1)),
                Some(done) => {
                    ranges.push(done);
                    Some((idx, idx + 1))
                }
                None => Some((idx, idx + 1)),
            };
        }
        ranges.extend(run);
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SearchParams;

    fn recent(keyword: &str, location: &str, ts: i64) -> RecentSearch {
        RecentSearch::from_params(&SearchParams::new(keyword, "10", "default", location), ts)
    }

    #[test]
    fn prefix_matches_popular_with_highlight() {
        let groups = SuggestionEngine::new().suggest("tay", &[]).unwrap();
        assert_eq!(groups.len(), 1);
        let SuggestionGroup::Keywords { source, items } = &groups[0] else {
            panic!("expected keyword group, got {groups:?}");
        };
        assert_eq!(*source, KeywordSource::Matching);
        assert_eq!(items[0].keyword, "Taylor Swift");
        assert_eq!(items[0].highlight_ranges, vec![(0, 3)]);
    }

    #[test]
    fn empty_prefix_without_history_shows_popular() {
        let groups = SuggestionEngine::new().suggest("", &[]).unwrap();
        assert_eq!(
            groups,
            vec![SuggestionGroup::Keywords {
                source: KeywordSource::Popular,
                items: ["Taylor Swift", "NBA", "Concert", "Theatre", "Comedy"]
                    .iter()
                    .map(|k| KeywordSuggestion {
                        keyword: (*k).to_string(),
                        highlight_ranges: Vec::new(),
                    })
                    .collect(),
            }]
        );
    }

    #[test]
    fn empty_prefix_with_history_shows_recent_keywords() {
        let history = [recent("jazz", "Chicago, IL", 3), recent("nba", "Boston, MA", 2), recent("jazz", "NYC", 1)];
        let groups = SuggestionEngine::new().suggest("  ", &history).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(matches!(groups[0], SuggestionGroup::RecentKeywords(_)));
        assert_eq!(groups[0].keywords(), vec!["jazz", "nba"]);
    }

    #[test]
    fn recent_searches_match_keyword_or_location() {
        let history = [
            recent("comedy", "Chicago, IL", 3),
            recent("rock", "Austin, TX", 2),
            recent("chess", "Boston, MA", 1),
        ];
        let groups = SuggestionEngine::new().suggest("CH", &history).unwrap();
        let SuggestionGroup::RecentSearches(searches) = &groups[0] else {
            panic!("expected recent searches first, got {groups:?}");
        };
        let keywords: Vec<&str> = searches.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["comedy", "chess"]);
    }

    #[test]
    fn ordering_is_searches_then_keywords() {
        let history = [recent("rockabilly", "Memphis, TN", 1)];
        let groups = SuggestionEngine::new().suggest("roc", &history).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(matches!(groups[0], SuggestionGroup::RecentSearches(_)));
        assert!(matches!(groups[1], SuggestionGroup::Keywords { source: KeywordSource::Matching, .. }));
    }

    #[test]
    fn exact_prefix_is_excluded() {
        let groups = SuggestionEngine::new().suggest(" jazz ", &[]);
        assert!(groups.is_none());
    }

    #[test]
    fn unmatched_prefix_falls_back_to_recent_keywords() {
        let history = [recent("opera", "Vienna", 2), recent("ballet", "Paris", 1)];
        let groups = SuggestionEngine::new().suggest("zzz", &history).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(matches!(groups[0], SuggestionGroup::RecentKeywords(_)));
        assert_eq!(groups[0].keywords(), vec!["opera", "ballet"]);
    }

    #[test]
    fn no_history_and_no_match_is_no_suggestions() {
        assert!(SuggestionEngine::new().suggest("zzz", &[]).is_none());
    }

    #[test]
    fn matching_recent_keywords_lead_the_keyword_group() {
        let history = [recent("rockabilly", "Memphis, TN", 2), recent("ROCK", "Austin, TX", 1)];
        let groups = SuggestionEngine::new().suggest("roc", &history).unwrap();
        let SuggestionGroup::Keywords { source, items } = &groups[1] else {
            panic!("expected keyword group second, got {groups:?}");
        };
        assert_eq!(*source, KeywordSource::Matching);
        let keywords: Vec<&str> = items.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["rockabilly", "ROCK"]);
        assert_eq!(items[0].highlight_ranges, vec![(0, 3)]);
    }

    #[test]
    fn group_caps_at_five() {
        let history: Vec<RecentSearch> = (0..9).map(|i| recent(&format!("band {i}"), "Paris", 10 - i)).collect();
        let groups = SuggestionEngine::new().suggest("band", &history).unwrap();
        assert_eq!(groups[0].len(), GROUP_LIMIT);
    }
}
