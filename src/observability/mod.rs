//! Structured logging for gigsearch.
//!
//! Every layer logs through `tracing` macros with structured fields, and
//! store operations and resolver steps run inside `debug_span!`s. This module
//! installs the subscriber that turns those into text.
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! Output goes to stderr, or to `log_file` when one is configured.
//!
//! # Modules
//!
//! - [`init`]: Tracing initialization and subscriber setup
//! - [`file_writer`]: Rotating file writer with size-based rotation

pub mod file_writer;
mod init;

pub use file_writer::FileWriter;
pub use init::{init_tracing, DEFAULT_TRACE_LEVEL};
