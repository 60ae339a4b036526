//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where gigsearch keeps its state on the host: the platform data
//! directory, the store file inside it, and `~` expansion for configured paths.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir, store_file};
