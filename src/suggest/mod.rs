//! Keyword suggestions for the search form.
//!
//! The dropdown under the keyword field mixes three sources: the user's recent
//! searches, their recent bare keywords, and a small curated list of popular
//! terms. [`SuggestionEngine`] ranks them for the current prefix.
//!
//! # Modules
//!
//! - `corpus`: Popular and related keyword tables
//! - `engine`: Prefix matching, grouping and highlight ranges

pub mod corpus;
pub mod engine;

pub use corpus::{related_to, POPULAR_KEYWORDS};
pub use engine::{KeywordSource, KeywordSuggestion, SuggestionEngine, SuggestionGroup};
