//! Development server core.
//!
//! - [`poller`]: watches the build's timestamp marker
//! - [`registry`]: open push-stream connections and broadcast
//! - [`events`]: the push-stream HTTP endpoint
//! - [`static_files`]: static file responder with fallback
//! - [`router`]: ordered exact/regex request routing
//! - [`server`]: wires the above into a running server

pub mod events;
pub mod poller;
pub mod registry;
pub mod router;
pub mod server;
pub mod static_files;

// Re-exports
pub use events::{event_stream, ConnectionGuard};
pub use poller::{PollStatus, PollerConfig, PollerHandle, TimestampChange, TimestampPoller};
pub use registry::{ConnectionId, ConnectionRegistry, EventSink};
pub use router::{RouteHandler, RoutePattern, RouteTable};
pub use server::{BoundServer, DevServer};
pub use static_files::StaticOptions;

use serde::{Deserialize, Serialize};

/// Messages pushed to connected browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DevEvent {
    /// The build output changed; the page should fully reload
    #[serde(rename = "app.reload")]
    AppReload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_event_json() {
        let json = serde_json::to_string(&DevEvent::AppReload).unwrap();
        assert_eq!(json, r#"{"type":"app.reload"}"#);

        let parsed: DevEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, DevEvent::AppReload);
    }
}
