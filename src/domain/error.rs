//! Error types for gigsearch.
//!
//! This module defines the centralized error type [`GigsearchError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! None of these errors are fatal to a search session. Store flush failures are
//! reported through [`crate::storage::Written`] and logged by callers, directory
//! failures become a "no records" outcome, and location failures surface as an
//! empty resolution.

use thiserror::Error;

/// The main error type for gigsearch operations.
///
/// # Examples
///
/// ```
/// use gigsearch::GigsearchError;
///
/// fn validate_config() -> Result<(), GigsearchError> {
///     Err(GigsearchError::Config("request_timeout_secs must be positive".to_string()))
/// }
/// ```
#[derive(Debug, Error)]
pub enum GigsearchError {
    /// Durable key-value storage failed.
    ///
    /// Covers backends that are unavailable, full, or refuse writes. The
    /// string describes what went wrong.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON payload could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The event directory answered, but not with something usable.
    ///
    /// Non-success status codes and response bodies with an unexpected shape
    /// end up here.
    #[error("Event directory error: {0}")]
    Directory(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for gigsearch operations.
pub type Result<T> = std::result::Result<T, GigsearchError>;
