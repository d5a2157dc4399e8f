//! Logging infrastructure.
//!
//! Structured logging on top of the `tracing` ecosystem. Request-level
//! failures (unreadable files, poller errors) are reported through
//! `tracing`, while human-facing status lines go through [`crate::ui`].
//!
//! # Example
//!
//! ```rust,no_run
//! use raiment_dev_server::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("Starting server");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "raiment_dev_server=debug,tower_http=debug";
const QUIET_FILTER: &str = "raiment_dev_server=error";
const DEFAULT_FILTER: &str = "raiment_dev_server=info";

/// Initialize the tracing subscriber.
///
/// The logging level is determined in this order:
/// 1. `--verbose`: DEBUG for this crate and per-request traces
/// 2. `--quiet`: ERROR only
/// 3. `RUST_LOG` environment variable
/// 4. Default: INFO for this crate
///
/// Must be called at most once per process.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(select_filter(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn select_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so these
    // only exercise filter construction.

    #[test]
    fn test_env_filter_verbose() {
        let filter = select_filter(true, false).to_string();
        assert!(filter.contains("raiment_dev_server=debug"));
        // Request traces from the router's TraceLayer.
        assert!(filter.contains("tower_http=debug"));
    }

    #[test]
    fn test_env_filter_quiet() {
        let filter = select_filter(false, true);
        assert!(filter.to_string().contains("raiment_dev_server=error"));
    }

    #[test]
    fn test_verbose_wins_over_quiet() {
        let filter = select_filter(true, true);
        assert!(filter.to_string().contains("debug"));
    }
}
