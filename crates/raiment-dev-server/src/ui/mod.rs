//! Terminal output for humans.
//!
//! Status lines and the startup banner go to stderr with colours when the
//! terminal supports them. Structured diagnostics belong in `tracing`
//! instead (see [`crate::logger`]).
//!
//! # Examples
//!
//! ```no_run
//! use raiment_dev_server::ui;
//!
//! ui::init_colors(false);
//! ui::success("Server started");
//! ui::warning("Port 80 may require root access");
//! ```

mod banner;
mod messages;

pub use banner::{print_banner, Banner};
pub use messages::{info, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// `owo-colors` styling is turned off globally when colours are not wanted,
/// either because `no_color` was requested or the environment says so.
pub fn init_colors(no_color: bool) {
    owo_colors::set_override(!no_color && should_use_color());
}
