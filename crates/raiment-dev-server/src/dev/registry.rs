//! Registry of open push-stream connections.
//!
//! Each connection is represented by the sending half of a bounded channel;
//! the receiving half feeds the HTTP response body (see
//! [`crate::dev::events`]). The registry only ever writes fully framed text
//! events into those channels.
//!
//! Connections are removed by their stream's own disconnect handling, never
//! by a failed write during broadcast.
//!
//! At shutdown the registry is closed: every sink is dropped, ending its
//! stream, and sinks added afterwards are dropped on arrival.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Identifier of one push-stream connection. Never reused within a process.
pub type ConnectionId = u64;

/// Output side of one push-stream connection.
pub type EventSink = mpsc::Sender<String>;

/// Frames buffered per connection before further broadcasts are dropped.
pub const SINK_CAPACITY: usize = 64;

/// Frame a serialized payload as a server-sent event.
pub fn frame_event(json: &str) -> String {
    format!("data: {}\r\n\r\n", json)
}

/// Thread-safe set of open connections.
///
/// Constructed once per server and shared behind an `Arc`. Ids start at 1
/// and strictly increase, so iterating the map visits connections in the
/// order they were added.
#[derive(Debug)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    closed: AtomicBool,
    connections: RwLock<BTreeMap<ConnectionId, EventSink>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            connections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a sink/receiver pair sized for a push stream.
    pub fn channel() -> (EventSink, mpsc::Receiver<String>) {
        mpsc::channel(SINK_CAPACITY)
    }

    /// Register a sink and return its newly allocated id.
    ///
    /// On a closed registry the sink is dropped instead, so its stream ends
    /// right away. The id is still allocated.
    pub fn add(&self, sink: EventSink) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut connections = self.connections.write();
        // `closed` only changes while the write lock is held.
        if self.closed.load(Ordering::Acquire) {
            drop(connections);
            tracing::debug!("Connection {} refused, registry closed", id);
            return id;
        }
        connections.insert(id, sink);
        let open = connections.len();
        drop(connections);
        tracing::debug!("Connection {} opened ({} open)", id, open);
        id
    }

    /// Remove a connection. Removing an unknown id is a no-op.
    ///
    /// Returns whether a connection was removed.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write();
        let removed = connections.remove(&id).is_some();
        let open = connections.len();
        drop(connections);
        if removed {
            tracing::debug!("Connection {} closed ({} open)", id, open);
        }
        removed
    }

    /// Send `payload` as JSON to every registered connection.
    ///
    /// The set of recipients is snapshotted before any write, so concurrent
    /// `add`/`remove` calls never block on or disturb the fan-out. Full or
    /// closed sinks are skipped. Returns the number of connections that
    /// accepted the frame.
    pub fn broadcast<T: Serialize + ?Sized>(&self, payload: &T) -> usize {
        let json = match serde_json::to_string(payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast payload: {}", e);
                return 0;
            }
        };
        let frame = frame_event(&json);

        let sinks: Vec<(ConnectionId, EventSink)> = self
            .connections
            .read()
            .iter()
            .map(|(id, sink)| (*id, sink.clone()))
            .collect();

        let mut delivered = 0;
        for (id, sink) in sinks {
            match sink.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!("Skipping connection {}: {}", id, e),
            }
        }
        delivered
    }

    /// Drop every sink, ending all open streams, and refuse new ones.
    ///
    /// Streams opened by requests that were already in flight end as soon
    /// as they register, so graceful shutdown never waits on them.
    pub fn close(&self) {
        let dropped = {
            let mut connections = self.connections.write();
            self.closed.store(true, Ordering::Release);
            std::mem::take(&mut *connections)
        };
        if !dropped.is_empty() {
            tracing::debug!("Closed {} connection(s)", dropped.len());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Ids of the open connections, in registry order.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.read().keys().copied().collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
