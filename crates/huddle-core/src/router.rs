//! Event routing.
//!
//! One router instance serves every connection: the transport layer
//! decodes inbound frames into [`ClientEvent`] variants and dispatches
//! them here. Handlers mutate the registry, derive room views, and emit
//! outbound events through the [`ConnectionGroup`] capabilities. Every
//! failure is terminal at the handler boundary: it is reported to the
//! originating connection only.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::RelayError;
use crate::events::{AckPayload, ClientEvent, ClientFrame, ServerEvent};
use crate::filter::MessageFilter;
use crate::message::{ChatMessage, LocationMessage};
use crate::registry::{ConnectionId, User, UserRegistry};
use crate::rooms::RoomSnapshot;
use crate::transport::ConnectionGroup;

/// Greeting sent to a connection that just joined.
pub const WELCOME_TEXT: &str = "Welcome!";

/// Direct notice for a message or location from a connection that never
/// joined.
pub const NOT_JOINED_NOTICE: &str = "Failed to connect to server. Try refreshing the page.";

/// Ack status for a delivered message.
pub const DELIVERED_STATUS: &str = "Delivered!";

/// Outcome of relaying a message or location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Broadcast to the sender's room
    Delivered,
    /// Sender had no registered user; a system notice was sent instead
    NotJoined,
}

/// Routes inbound connection events to registry mutations and outbound
/// broadcasts.
pub struct EventRouter<G> {
    registry: Arc<UserRegistry>,
    group: G,
    filter: Arc<dyn MessageFilter>,
}

impl<G: ConnectionGroup> EventRouter<G> {
    /// Create a router over a registry, a transport group, and a content
    /// filter.
    pub fn new(registry: Arc<UserRegistry>, group: G, filter: Arc<dyn MessageFilter>) -> Self {
        Self {
            registry,
            group,
            filter,
        }
    }

    /// The registry backing this router.
    pub fn registry(&self) -> &Arc<UserRegistry> {
        &self.registry
    }

    /// Handle one decoded client frame and emit its ack, when requested.
    ///
    /// The not-joined message/location path produces no ack; the
    /// connection receives the direct system notice instead.
    pub async fn dispatch(&self, connection_id: ConnectionId, frame: ClientFrame) {
        let ack = frame.ack;
        let reply = match frame.event {
            ClientEvent::Join { username, room } => {
                match self.handle_join(connection_id, &username, &room).await {
                    Ok(_) => ack.map(AckPayload::ok),
                    Err(err) => ack.map(|id| AckPayload::error(id, err.to_string())),
                }
            }
            ClientEvent::SendMessage { text } => {
                match self.handle_message(connection_id, &text).await {
                    Ok(RelayOutcome::Delivered) => {
                        ack.map(|id| AckPayload::status(id, DELIVERED_STATUS))
                    }
                    Ok(RelayOutcome::NotJoined) => None,
                    Err(err) => ack.map(|id| AckPayload::error(id, err.to_string())),
                }
            }
            ClientEvent::SendLocation {
                latitude,
                longitude,
            } => {
                match self
                    .handle_location(connection_id, latitude, longitude)
                    .await
                {
                    Ok(RelayOutcome::Delivered) => ack.map(AckPayload::ok),
                    Ok(RelayOutcome::NotJoined) => None,
                    Err(err) => ack.map(|id| AckPayload::error(id, err.to_string())),
                }
            }
        };

        if let Some(payload) = reply {
            self.group
                .send(connection_id, ServerEvent::Ack(payload))
                .await;
        }
    }

    /// Register the user and announce the join to the room.
    ///
    /// On failure nothing is broadcast; the error reaches the caller only.
    #[instrument(skip(self, username, room), fields(connection = %connection_id))]
    pub async fn handle_join(
        &self,
        connection_id: ConnectionId,
        username: &str,
        room: &str,
    ) -> Result<User, RelayError> {
        let user = self.registry.add_user(connection_id, username, room).await?;

        info!(user = %user.username, room = %user.room, "User joined room");

        self.group
            .send(
                connection_id,
                ServerEvent::Message(ChatMessage::system(WELCOME_TEXT)),
            )
            .await;
        self.group
            .broadcast_except(
                &user.room,
                connection_id,
                ServerEvent::Message(ChatMessage::system(format!(
                    "{} has joined!",
                    user.username
                ))),
            )
            .await;

        let snapshot = RoomSnapshot::capture(&self.registry, &user.room).await;
        self.group
            .broadcast(&user.room, ServerEvent::RoomData(snapshot))
            .await;

        Ok(user)
    }

    /// Relay a text message to the sender's room, sender included.
    #[instrument(skip(self, text), fields(connection = %connection_id))]
    pub async fn handle_message(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Result<RelayOutcome, RelayError> {
        let Some(user) = self.registry.get_user(connection_id).await else {
            warn!("Message from connection with no registered user");
            self.group
                .send(
                    connection_id,
                    ServerEvent::Message(ChatMessage::system(NOT_JOINED_NOTICE)),
                )
                .await;
            return Ok(RelayOutcome::NotJoined);
        };

        if self.filter.is_profane(text) {
            debug!(user = %user.username, "Message rejected by content filter");
            return Err(RelayError::ProfanityRejected);
        }

        self.group
            .broadcast(
                &user.room,
                ServerEvent::Message(ChatMessage::new(user.username, text)),
            )
            .await;
        Ok(RelayOutcome::Delivered)
    }

    /// Relay the sender's location to the room, sender included.
    #[instrument(skip(self), fields(connection = %connection_id))]
    pub async fn handle_location(
        &self,
        connection_id: ConnectionId,
        latitude: f64,
        longitude: f64,
    ) -> Result<RelayOutcome, RelayError> {
        let Some(user) = self.registry.get_user(connection_id).await else {
            warn!("Location from connection with no registered user");
            self.group
                .send(
                    connection_id,
                    ServerEvent::Message(ChatMessage::system(NOT_JOINED_NOTICE)),
                )
                .await;
            return Ok(RelayOutcome::NotJoined);
        };

        self.group
            .broadcast(
                &user.room,
                ServerEvent::LocationMessage(LocationMessage::new(
                    user.username,
                    latitude,
                    longitude,
                )),
            )
            .await;
        Ok(RelayOutcome::Delivered)
    }

    /// Remove the connection's user and announce the departure.
    ///
    /// A disconnect before join removes nothing and broadcasts nothing.
    /// When the departed user was the last room member, the broadcast
    /// target set is empty and nothing is emitted.
    #[instrument(skip(self), fields(connection = %connection_id))]
    pub async fn handle_disconnect(&self, connection_id: ConnectionId) {
        let Some(user) = self.registry.remove_user(connection_id).await else {
            return;
        };

        info!(user = %user.username, room = %user.room, "User left room");

        self.group
            .broadcast(
                &user.room,
                ServerEvent::Message(ChatMessage::system(format!("{} has left!", user.username))),
            )
            .await;

        let snapshot = RoomSnapshot::capture(&self.registry, &user.room).await;
        self.group
            .broadcast(&user.room, ServerEvent::RoomData(snapshot))
            .await;
    }
}
