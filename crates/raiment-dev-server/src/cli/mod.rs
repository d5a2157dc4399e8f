//! Command-line interface definition.
//!
//! Every server option is optional on the command line so that values from
//! the config file and environment are only overridden by flags that were
//! actually given (see [`crate::config::ServerConfig::load`]).

mod tests;

use clap::{Args, Parser};
use std::path::PathBuf;

/// Loopback development server with live reload
#[derive(Parser, Debug)]
#[command(
    name = "raiment-dev-server",
    version,
    about = "Loopback development server with live reload",
    long_about = "Serves a build output directory over HTTP on 127.0.0.1 and pushes a\n\
                  reload event to every open browser tab whenever the build's timestamp\n\
                  marker file changes. Not intended for production use."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub serve: ServeArgs,
}

/// Server options
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// Display name shown in the startup banner [default: raiment-dev-server]
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Port to listen on [default: 7000]
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory to serve static files from [default: dist]
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Marker file touched by the build; its modification time triggers reloads
    /// [default: dist/.build-timestamp]
    #[arg(long, value_name = "FILE")]
    pub timestamp_file: Option<PathBuf>,

    /// File to serve when a requested path does not exist (e.g. index.html)
    #[arg(long, value_name = "FILE")]
    pub fallback: Option<String>,

    /// Leading path segment removed before resolving static files (e.g. app/)
    #[arg(long, value_name = "PREFIX")]
    pub strip_prefix: Option<String>,

    /// Path to a JSON config file [default: raiment-dev.json if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
