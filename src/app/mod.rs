//! Application layer coordinating searches, stores and collaborators.
//!
//! This module sits between the front end (the command line in `main.rs`) and
//! the domain, storage, location and directory layers. A front end builds one
//! [`SearchSession`] and drives it with form submissions and keystrokes.
//!
//! # Architecture
//!
//! ```text
//! SearchForm ─▶ SearchSession::submit ─▶ SubmitOutcome
//!                  │        │
//!        LocationResolver  EventDirectory
//!                  │
//!     RecencyStore · SearchResultHistory · FavoritesStore
//! ```
//!
//! # Modules
//!
//! - [`session`]: The session and its submit flow
//! - [`generation`]: Single-flight generation counter

pub mod generation;
pub mod session;

pub use generation::{Generation, GenerationCounter};
pub use session::{SearchSession, SubmitOutcome};
