//! Domain layer for gigsearch.
//!
//! Core value types shared by every other layer, independent of storage
//! backends, HTTP clients, or the command line front end.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`event`]: Search hits and favorite snapshots
//! - [`search`]: Search identity keys, recent searches, the search form, categories
//! - [`coordinates`]: Latitude/longitude pairs
//!
//! # Examples
//!
//! ```
//! use gigsearch::domain::{SearchForm, SearchParams};
//!
//! let form = SearchForm {
//!     keyword: "jazz".to_string(),
//!     radius: "25".to_string(),
//!     ..SearchForm::default()
//! };
//! assert_eq!(
//!     form.to_params("Chicago, IL"),
//!     SearchParams::new("jazz", "25", "default", "Chicago, IL")
//! );
//! ```

pub mod coordinates;
pub mod error;
pub mod event;
pub mod search;

pub use coordinates::Coordinates;
pub use error::{GigsearchError, Result};
pub use event::{FavoriteEvent, MappedEvent};
pub use search::{Category, RecentSearch, SearchForm, SearchParams, DEFAULT_CATEGORY, DEFAULT_RADIUS};
