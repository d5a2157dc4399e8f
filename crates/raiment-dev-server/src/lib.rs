//! Raiment development server.
//!
//! A loopback-only HTTP server for the asset pipeline and the browser-based
//! tools: it serves the build output directory and tells every open tab to
//! reload when the build finishes.
//!
//! # Architecture
//!
//! - [`dev`] - the server core: timestamp poller, connection registry,
//!   push-stream endpoint, static file responder and request router
//! - [`config`] - layered configuration (defaults, JSON file, environment, CLI)
//! - [`error`] - error types with actionable messages
//! - [`logger`] - structured logging with tracing
//! - [`ui`] - terminal status lines and the startup banner
//! - [`commands`] - the `serve` command
//!
//! # Example
//!
//! ```rust,no_run
//! use raiment_dev_server::config::ServerConfig;
//! use raiment_dev_server::dev::DevServer;
//!
//! # async fn run() -> raiment_dev_server::Result<()> {
//! let server = DevServer::new(ServerConfig::default()).bind().await?;
//! println!("listening on {}", server.url());
//! server.serve(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
