//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Io(e) => miette::miette!(
            help = "Check that the port is free and the output directory is readable",
            "I/O error: {}",
            e
        ),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidValue { field, value, hint } => {
            miette::miette!(help = hint, "Invalid value for '{}': {}", field, value)
        }
        ConfigError::MissingField { field, hint } => {
            miette::miette!(help = hint, "Missing required field: {}", field)
        }
        other => miette::miette!("Configuration error: {}", other),
    }
}
