//! Connection-group capabilities required of a transport.
//!
//! The router depends only on this interface; the server crate provides
//! the WebSocket-backed implementation.

use async_trait::async_trait;

use crate::events::ServerEvent;
use crate::registry::ConnectionId;

/// Publish primitives over a set of live connections.
///
/// Delivery is best-effort: implementations log failures and never surface
/// them to the router.
#[async_trait]
pub trait ConnectionGroup: Send + Sync {
    /// Deliver an event to a single connection.
    async fn send(&self, target: ConnectionId, event: ServerEvent);

    /// Deliver an event to every connection joined to `room`.
    async fn broadcast(&self, room: &str, event: ServerEvent);

    /// Deliver an event to every connection in `room` except `exclude`.
    async fn broadcast_except(&self, room: &str, exclude: ConnectionId, event: ServerEvent);
}
