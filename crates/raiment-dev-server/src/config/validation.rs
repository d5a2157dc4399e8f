use crate::config::ServerConfig;
use crate::error::{ConfigError, Result};

impl ServerConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "title".to_string(),
                hint: "Provide a display name with --title".to_string(),
            }
            .into());
        }

        if self.timestamp_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "timestamp_file".to_string(),
                hint: "Point --timestamp-file at the marker your build touches".to_string(),
            }
            .into());
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms".to_string(),
                value: "0".to_string(),
                hint: "Poll interval must be greater than zero".to_string(),
            }
            .into());
        }

        if let Some(default_file) = &self.default_file {
            if default_file.trim_start_matches('/').is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "default_file".to_string(),
                    value: default_file.clone(),
                    hint: "Fallback must name a file, e.g. index.html".to_string(),
                }
                .into());
            }
        }

        if self.port != 0 && self.port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                self.port
            ));
        }

        Ok(())
    }
}
