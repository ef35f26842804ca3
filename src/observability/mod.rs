//! Observability for fare searches.
//!
//! Two layers are provided:
//! - [`Logger`] writes a Markdown search log (one file per run, appended to)
//! - [`init_tracing`] installs a `tracing` subscriber for console output
//!
//! # Example
//!
//! ```no_run
//! use farescout::observability::Logger;
//! use farescout::search::SearchRequest;
//!
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//! let request =
//!     SearchRequest::new("Johannesburg", "Athens", "June 15, 2026", "June 29, 2026").unwrap();
//!
//! logger.log_search_start("search-1", &request, 3).unwrap();
//! logger.log_attempt_start(1, 3).unwrap();
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::Logger;

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice is harmless;
/// the second call leaves the first subscriber in place.
#[cfg(feature = "observability")]
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
