//! Push-stream endpoint.
//!
//! Turns one request into a long-lived `text/event-stream` response backed
//! by a [`ConnectionRegistry`] entry. The entry lives exactly as long as the
//! response body: when the client disconnects the transport drops the body,
//! and the [`ConnectionGuard`] inside it removes the entry.

use crate::dev::registry::{ConnectionId, ConnectionRegistry, EventSink};
use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Comment frame written on idle streams. Clients ignore it.
pub const KEEP_ALIVE_FRAME: &str = ":\r\n\r\n";

/// Registration of one open stream. Removes itself from the registry on drop.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
}

impl ConnectionGuard {
    pub fn register(registry: Arc<ConnectionRegistry>, sink: EventSink) -> Self {
        let id = registry.add(sink);
        Self { id, registry }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// Open a push stream registered in `registry`.
///
/// The body never ends on its own; it ends when the client goes away or the
/// registry drops the connection's sink (see [`ConnectionRegistry::close`]).
pub fn event_stream(registry: Arc<ConnectionRegistry>, keep_alive: Option<Duration>) -> Response {
    let (sink, mut frames) = ConnectionRegistry::channel();
    let guard = ConnectionGuard::register(registry, sink);
    tracing::info!("Client {} connected", guard.id());

    let body = async_stream::stream! {
        let guard = guard;
        let mut ticker = keep_alive.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let frame = match ticker.as_mut() {
                Some(ticker) => tokio::select! {
                    frame = frames.recv() => frame,
                    _ = ticker.tick() => Some(KEEP_ALIVE_FRAME.to_string()),
                },
                None => frames.recv().await,
            };

            match frame {
                Some(frame) => yield Ok::<_, Infallible>(Bytes::from(frame)),
                None => break,
            }
        }

        tracing::debug!("Stream for client {} ended", guard.id());
    };

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use tokio_stream::StreamExt;

    #[test]
    fn test_guard_removes_on_drop() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (sink, _rx) = ConnectionRegistry::channel();

        let guard = ConnectionGuard::register(registry.clone(), sink);
        let id = guard.id();
        assert!(registry.contains(id));

        drop(guard);
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_headers_and_registration() {
        let registry = Arc::new(ConnectionRegistry::new());
        let response = event_stream(registry.clone(), None);

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(registry.len(), 1);

        drop(response);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_event_stream_delivers_broadcast() {
        let registry = Arc::new(ConnectionRegistry::new());
        let response = event_stream(registry.clone(), None);
        let mut body = response.into_body().into_data_stream();

        registry.broadcast(&json!({ "type": "app.reload" }));

        let chunk = body.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"data: {\"type\":\"app.reload\"}\r\n\r\n");
    }

    #[tokio::test]
    async fn test_event_stream_ends_when_registry_closed() {
        let registry = Arc::new(ConnectionRegistry::new());
        let response = event_stream(registry.clone(), None);
        let mut body = response.into_body().into_data_stream();

        registry.close();
        assert!(body.next().await.is_none());
    }

    #[tokio::test]
    async fn test_event_stream_on_closed_registry_ends_immediately() {
        let registry = Arc::new(ConnectionRegistry::new());
        registry.close();

        let response = event_stream(registry.clone(), Some(Duration::from_secs(15)));
        assert!(registry.is_empty());

        let mut body = response.into_body().into_data_stream();
        assert!(body.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_stream_keep_alive() {
        let registry = Arc::new(ConnectionRegistry::new());
        let response = event_stream(registry.clone(), Some(Duration::from_secs(15)));
        let mut body = response.into_body().into_data_stream();

        let chunk = body.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], KEEP_ALIVE_FRAME.as_bytes());
    }

    #[tokio::test]
    async fn test_each_stream_gets_its_own_id() {
        let registry = Arc::new(ConnectionRegistry::new());
        let first = event_stream(registry.clone(), None);
        let second = event_stream(registry.clone(), None);

        let ids = registry.ids();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        drop(first);
        assert_eq!(registry.ids(), vec![ids[1]]);
        drop(second);
        assert!(registry.is_empty());
    }
}
