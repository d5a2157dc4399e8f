//! Serve command implementation.
//!
//! Orchestrates the server lifecycle:
//! - Load and validate configuration
//! - Bind the loopback listener
//! - Print the startup banner
//! - Serve until Ctrl+C, then shut down gracefully

use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::dev::DevServer;
use crate::error::Result;
use crate::ui::{self, Banner};
use tokio::signal;

/// Execute the serve command.
///
/// # Errors
///
/// Returns errors for invalid configuration and for a port that cannot be
/// bound. Request-level failures never end the command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::load(&args)?;

    if !config.out_dir.is_dir() {
        ui::warning(&format!(
            "Output directory {} does not exist yet; requests will 404 until the build creates it",
            config.out_dir.display()
        ));
    }

    let server = DevServer::new(config).bind().await?;

    let url = server.url();
    let config = server.config();
    ui::print_banner(&Banner {
        title: &config.title,
        url: &url,
        out_dir: &config.out_dir,
        timestamp_file: &config.timestamp_file,
    });
    tracing::info!("Listening on {}", server.local_addr());
    ui::info("Press Ctrl+C to stop");

    server.serve(shutdown_signal()).await?;

    ui::success("Development server stopped");
    Ok(())
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a signal handler the server runs until killed.
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    ui::info("Shutting down development server...");
}
