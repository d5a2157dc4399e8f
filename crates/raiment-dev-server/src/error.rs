//! Error handling for the development server.
//!
//! Errors are modelled with `thiserror`. [`CliError`] is the top-level type
//! returned by commands and server startup; [`ConfigError`] carries detailed,
//! actionable messages for configuration problems and converts into
//! `CliError` automatically.
//!
//! Errors local to a single HTTP request never reach these types: the
//! request handlers turn them into status responses. Only startup failures
//! (bad configuration, a port that cannot be bound) and fatal I/O end up
//! here.

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (invalid file, bad values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors from file system or socket operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Check the path given to --config", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
