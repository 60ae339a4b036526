//! Tracing initialization and subscriber setup.
//!
//! Builds the subscriber pipeline from `tracing` macros to formatted output:
//! an [`EnvFilter`] followed by a `fmt` layer writing either to stderr or to a
//! rotating log file.

use super::file_writer::FileWriter;
use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when neither `RUST_LOG` nor the configuration names one.
pub const DEFAULT_TRACE_LEVEL: &str = "info";

/// Builds the filter for `config`.
///
/// `RUST_LOG` wins when set; otherwise `config.trace_level`, then
/// [`DEFAULT_TRACE_LEVEL`]. Unparsable directives are ignored by
/// `tracing-subscriber`, so this never fails.
fn build_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config
            .trace_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
            .unwrap_or(DEFAULT_TRACE_LEVEL);
        EnvFilter::new(level)
    })
}

/// Initializes the global tracing subscriber.
///
/// When `config.log_file` is set, output goes to that file through a
/// [`FileWriter`] (rotating at 10 MB, keeping three backups) and ANSI colours
/// are disabled. Otherwise output goes to stderr.
///
/// # Initialization Behavior
///
/// - Creates the log file's directory if it doesn't exist
/// - Falls back to stderr if that directory cannot be created
/// - Idempotent: safe to call multiple times (only the first call takes effect)
///
/// # Example
///
/// ```rust
/// use gigsearch::observability::init_tracing;
/// use gigsearch::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Config::default()
/// };
///
/// init_tracing(&config);
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let file_writer = config.log_file.as_ref().and_then(|path| {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("gigsearch: cannot create log directory {}: {e}", parent.display());
                return None;
            }
        }
        Some(FileWriter::new(path.clone()))
    });

    let (file_layer, stderr_layer) = match file_writer {
        Some(writer) => (Some(fmt::layer().with_ansi(false).with_writer(writer)), None),
        None => (None, Some(fmt::layer().with_writer(std::io::stderr))),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(file_layer)
        .with(stderr_layer);

    let _ = subscriber.try_init();
}
