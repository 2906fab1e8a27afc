//! WebSocket connection fan-out.
//!
//! Tracks the outbound channel of every live WebSocket and implements the
//! [`ConnectionGroup`] capabilities on top of it. Room broadcast targets
//! are resolved from the user registry at send time, so membership has a
//! single source of truth.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use huddle_core::{ConnectionGroup, ConnectionId, ServerEvent, UserRegistry};

/// Outbound channel capacity per connection.
pub const OUTBOUND_BUFFER: usize = 256;

/// Result of queueing an event for one connection.
#[derive(Debug)]
pub enum SendResult {
    /// Event was queued for delivery
    Sent,
    /// No channel is registered for the connection
    NotConnected,
    /// The outbound channel is full (backpressure); the event was dropped
    ChannelFull,
    /// The outbound channel is closed; the stale entry was removed
    ChannelClosed,
    /// The event could not be encoded
    EncodeFailed,
}

/// Registry of live WebSocket outbound channels.
///
/// Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct WsConnections {
    registry: Arc<UserRegistry>,
    senders: Arc<DashMap<ConnectionId, mpsc::Sender<Message>>>,
}

impl WsConnections {
    /// Create an empty connection set over the given user registry.
    pub fn new(registry: Arc<UserRegistry>) -> Self {
        Self {
            registry,
            senders: Arc::new(DashMap::new()),
        }
    }

    /// Register the outbound channel for a connection.
    pub fn register(&self, connection_id: ConnectionId, sender: mpsc::Sender<Message>) {
        if self.senders.insert(connection_id, sender).is_some() {
            warn!(connection = %connection_id, "Replaced existing connection channel");
        } else {
            debug!(connection = %connection_id, "Connection registered");
        }
    }

    /// Drop the outbound channel for a connection.
    pub fn unregister(&self, connection_id: ConnectionId) {
        if self.senders.remove(&connection_id).is_some() {
            debug!(connection = %connection_id, "Connection unregistered");
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.senders.len()
    }

    /// Serialize and queue one event for one connection.
    ///
    /// Delivery is best-effort: every failure is logged and absorbed here.
    fn deliver(&self, connection_id: ConnectionId, event: &ServerEvent) -> SendResult {
        let sender = match self.senders.get(&connection_id) {
            Some(entry) => entry.value().clone(),
            None => {
                debug!(connection = %connection_id, "Recipient not connected");
                return SendResult::NotConnected;
            }
        };

        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(err) => {
                warn!(connection = %connection_id, error = %err, "Failed to encode outbound event");
                return SendResult::EncodeFailed;
            }
        };

        match sender.try_send(Message::Text(text)) {
            Ok(()) => SendResult::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(connection = %connection_id, "Outbound channel full, dropping event");
                SendResult::ChannelFull
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(connection = %connection_id, "Outbound channel closed, removing connection");
                self.senders.remove(&connection_id);
                SendResult::ChannelClosed
            }
        }
    }
}

#[async_trait]
impl ConnectionGroup for WsConnections {
    async fn send(&self, target: ConnectionId, event: ServerEvent) {
        self.deliver(target, &event);
    }

    async fn broadcast(&self, room: &str, event: ServerEvent) {
        for target in self.registry.connections_in_room(room).await {
            self.deliver(target, &event);
        }
    }

    async fn broadcast_except(&self, room: &str, exclude: ConnectionId, event: ServerEvent) {
        for target in self.registry.connections_in_room(room).await {
            if target != exclude {
                self.deliver(target, &event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::ChatMessage;

    fn test_event(text: &str) -> ServerEvent {
        ServerEvent::Message(ChatMessage::system(text))
    }

    #[tokio::test]
    async fn deliver_queues_encoded_event() {
        let connections = WsConnections::new(Arc::new(UserRegistry::new()));
        let id = ConnectionId::new();
        let (tx, mut rx) = mpsc::channel(8);
        connections.register(id, tx);

        let result = connections.deliver(id, &test_event("hi"));
        assert!(matches!(result, SendResult::Sent));

        match rx.recv().await.unwrap() {
            Message::Text(text) => {
                assert!(text.contains(r#""event":"message""#));
                assert!(text.contains(r#""text":"hi""#));
            }
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deliver_to_unknown_connection_reports_not_connected() {
        let connections = WsConnections::new(Arc::new(UserRegistry::new()));

        let result = connections.deliver(ConnectionId::new(), &test_event("hi"));
        assert!(matches!(result, SendResult::NotConnected));
    }

    #[tokio::test]
    async fn deliver_to_closed_channel_removes_stale_entry() {
        let connections = WsConnections::new(Arc::new(UserRegistry::new()));
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(8);
        connections.register(id, tx);
        drop(rx);

        let result = connections.deliver(id, &test_event("hi"));
        assert!(matches!(result, SendResult::ChannelClosed));
        assert_eq!(connections.connection_count(), 0);
    }

    #[tokio::test]
    async fn deliver_to_full_channel_reports_backpressure() {
        let connections = WsConnections::new(Arc::new(UserRegistry::new()));
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(1);
        connections.register(id, tx);

        assert!(matches!(connections.deliver(id, &test_event("a")), SendResult::Sent));
        assert!(matches!(
            connections.deliver(id, &test_event("b")),
            SendResult::ChannelFull
        ));
    }

    #[tokio::test]
    async fn broadcast_targets_room_members_only() {
        let registry = Arc::new(UserRegistry::new());
        let connections = WsConnections::new(registry.clone());

        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();
        registry.add_user(a, "alice", "general").await.unwrap();
        registry.add_user(b, "bob", "general").await.unwrap();
        registry.add_user(c, "carol", "other-room").await.unwrap();

        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let (tx_c, mut rx_c) = mpsc::channel(8);
        connections.register(a, tx_a);
        connections.register(b, tx_b);
        connections.register(c, tx_c);

        connections.broadcast("general", test_event("hi")).await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_except_skips_excluded_connection() {
        let registry = Arc::new(UserRegistry::new());
        let connections = WsConnections::new(registry.clone());

        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.add_user(a, "alice", "general").await.unwrap();
        registry.add_user(b, "bob", "general").await.unwrap();

        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        connections.register(a, tx_a);
        connections.register(b, tx_b);

        connections
            .broadcast_except("general", a, test_event("hi"))
            .await;

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }
}
