//! Server configuration with multi-source loading.
//!
//! Merges settings from CLI flags, environment variables and an optional
//! JSON config file.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use crate::dev::{PollerConfig, StaticOptions};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ENV_PREFIX};

/// Development server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Display name shown in the startup banner
    pub title: String,

    /// Listen port on the loopback interface (0 picks a free port)
    pub port: u16,

    /// Directory static files are served from
    pub out_dir: PathBuf,

    /// Build-output timestamp marker whose modification time is polled
    pub timestamp_file: PathBuf,

    /// File served when a requested path does not exist (SPA fallback)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_file: Option<String>,

    /// Leading path segment removed before resolving static files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,

    /// Minimum delay between two polls of the timestamp file
    pub poll_interval_ms: u64,

    /// Random extra delay added to each poll, drawn from `[0, poll_jitter_ms)`
    pub poll_jitter_ms: u64,

    /// Keep-alive comment interval on push streams; 0 disables it
    pub keep_alive_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            port: DEFAULT_PORT,
            out_dir: default_out_dir(),
            timestamp_file: default_timestamp_file(),
            default_file: None,
            strip_prefix: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_jitter_ms: DEFAULT_POLL_JITTER_MS,
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
        }
    }
}

impl ServerConfig {
    /// Loopback socket address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.port))
    }

    /// Poll timing for the timestamp watcher.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            jitter: Duration::from_millis(self.poll_jitter_ms),
        }
    }

    /// Options for the catch-all static file route.
    pub fn static_options(&self) -> StaticOptions {
        StaticOptions {
            default_file: self.default_file.clone(),
            strip_prefix: self.strip_prefix.clone(),
        }
    }

    /// Keep-alive interval for push streams, if enabled.
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_secs > 0).then(|| Duration::from_secs(self.keep_alive_secs))
    }
}
