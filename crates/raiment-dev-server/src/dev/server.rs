//! Development server wiring.
//!
//! Three routes, checked in order:
//! - `/status`: health check, `200 OK`
//! - `/api/events`: push stream of [`DevEvent`]s
//! - everything else: static files from the output directory
//!
//! A background [`TimestampPoller`] broadcasts [`DevEvent::AppReload`] to
//! every open push stream whenever the build's timestamp marker changes.

use crate::config::ServerConfig;
use crate::dev::{
    event_stream, static_files, ConnectionRegistry, DevEvent, PollerHandle, RouteTable,
    TimestampChange, TimestampPoller,
};
use crate::error::{CliError, Result};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Path of the health check route.
pub const STATUS_PATH: &str = "/status";

/// Path of the push-stream route.
pub const EVENTS_PATH: &str = "/api/events";

/// Development server, configured but not yet listening.
pub struct DevServer {
    config: ServerConfig,
    registry: Arc<ConnectionRegistry>,
}

impl DevServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registry shared by the event route and the reload poller.
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Build the route table.
    pub fn routes(&self) -> Result<RouteTable> {
        let registry = self.registry();
        let keep_alive = self.config.keep_alive();
        let out_dir = Arc::new(self.config.out_dir.clone());
        let options = Arc::new(self.config.static_options());

        let table = RouteTable::new()
            .exact(STATUS_PATH, |_request: Request| async {
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "OK",
                )
                    .into_response()
            })
            .exact(EVENTS_PATH, move |_request: Request| {
                let registry = Arc::clone(&registry);
                async move { event_stream(registry, keep_alive) }
            })
            .matching(".*", move |request: Request| {
                let out_dir = Arc::clone(&out_dir);
                let options = Arc::clone(&options);
                let path = request.uri().path().to_owned();
                async move { static_files::respond(&out_dir, &path, &options).await }
            })
            .map_err(|e| CliError::Server(format!("Invalid route pattern: {}", e)))?;

        Ok(table)
    }

    /// Bind the loopback listener.
    ///
    /// # Errors
    ///
    /// Returns error if the configured port cannot be bound.
    pub async fn bind(self) -> Result<BoundServer> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        Ok(BoundServer {
            server: self,
            listener,
            local_addr,
        })
    }
}

/// Development server with a bound listener.
pub struct BoundServer {
    server: DevServer,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub fn config(&self) -> &ServerConfig {
        self.server.config()
    }

    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.server.registry()
    }

    /// Serve requests and watch for rebuilds until `shutdown` resolves.
    ///
    /// On shutdown the registry is closed, ending every push stream
    /// including ones opened by requests still in flight, so that graceful
    /// shutdown does not wait on them. Then the poller is stopped. A failed poller
    /// is logged and never stops request handling.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.server.routes()?.into_router();
        let registry = self.server.registry();
        let poller = spawn_reload_poller(&self.server);

        let result = axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                registry.close();
            })
            .await;

        if let Err(e) = poller.stop().await {
            tracing::warn!("Reload poller had stopped with an error: {}", e);
        }

        result.map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

fn spawn_reload_poller(server: &DevServer) -> PollerHandle {
    let registry = server.registry();
    TimestampPoller::spawn(
        server.config.timestamp_file.clone(),
        server.config.poller_config(),
        move |change: TimestampChange| {
            let delivered = registry.broadcast(&DevEvent::AppReload);
            tracing::debug!(
                "Timestamp {:?} -> {}, reload sent to {} client(s)",
                change.previous,
                change.current,
                delivered
            );
            crate::ui::info(&format!(
                "Build output changed, reloading {} client(s)",
                delivered
            ));
        },
    )
}
