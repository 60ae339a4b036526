//! Follow-up searches suggested under a result set.

use crate::domain::{Category, SearchParams};
use crate::suggest::corpus::related_to;

/// Keyword used for category recommendations when the search had none.
pub const FALLBACK_KEYWORD: &str = "events";

/// Maximum related keyword searches offered.
pub const RELATED_LIMIT: usize = 4;

/// Categories offered for exploration, in display order.
pub const EXPLORE_CATEGORIES: [Category; 4] = [
    Category::Music,
    Category::Sports,
    Category::ArtsTheatre,
    Category::Film,
];

/// Ready-to-run follow-up searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recommendations {
    /// Same location, radius and category, different keyword.
    pub related: Vec<SearchParams>,
    /// Same keyword and location in another category.
    pub categories: Vec<(Category, SearchParams)>,
}

impl Recommendations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.related.is_empty() && self.categories.is_empty()
    }
}

/// Builds recommendations for a completed search.
///
/// Related keywords come from the static relation table; the current keyword
/// is never suggested back. A blank keyword gets no related keywords.
#[must_use]
pub fn recommend(params: &SearchParams) -> Recommendations {
    let keyword = params.keyword.trim();

    let related = if keyword.is_empty() {
        Vec::new()
    } else {
        let current = keyword.to_lowercase();
        related_to(keyword)
            .iter()
            .filter(|candidate| candidate.to_lowercase() != current)
            .take(RELATED_LIMIT)
            .map(|candidate| SearchParams {
                keyword: (*candidate).to_string(),
                ..params.clone()
            })
            .collect()
    };

    let explore_keyword = if keyword.is_empty() { FALLBACK_KEYWORD } else { keyword };
    let categories = EXPLORE_CATEGORIES
        .into_iter()
        .filter(|category| category.segment_id() != params.category)
        .map(|category| {
            (
                category,
                SearchParams {
                    keyword: explore_keyword.to_string(),
                    radius: params.radius.clone(),
                    category: category.segment_id().to_string(),
                    location: params.location.clone(),
                },
            )
        })
        .collect();

    Recommendations { related, categories }
}
