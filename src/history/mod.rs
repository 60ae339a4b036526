//! In-memory result history and follow-up recommendations.
//!
//! # Modules
//!
//! - `results`: Bounded list of recent result sets
//! - `recommend`: Related keyword and category searches

pub mod recommend;
pub mod results;

pub use recommend::{recommend, Recommendations};
pub use results::{SearchResultEntry, SearchResultHistory};
