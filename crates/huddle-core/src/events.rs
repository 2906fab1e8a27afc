//! Wire protocol events.
//!
//! Inbound and outbound events form closed sets; the transport layer
//! decodes JSON text frames into these types and never dispatches on raw
//! event names.

use serde::{Deserialize, Serialize};

use crate::message::{ChatMessage, LocationMessage};
use crate::rooms::RoomSnapshot;

/// Inbound events (client to server).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join a room under a username
    Join { username: String, room: String },
    /// Relay a text message to the sender's room
    SendMessage { text: String },
    /// Relay the sender's location to the room
    SendLocation { latitude: f64, longitude: f64 },
}

/// One decoded client frame: an event plus an optional ack correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Correlation id echoed in the ack reply, when the client wants one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    /// The event payload
    #[serde(flatten)]
    pub event: ClientEvent,
}

/// Outbound events (server to client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Text message, direct or room broadcast
    Message(ChatMessage),
    /// Location share, room broadcast
    LocationMessage(LocationMessage),
    /// Membership snapshot, room broadcast
    RoomData(RoomSnapshot),
    /// Correlated reply to an inbound frame
    Ack(AckPayload),
}

/// Acknowledgment for an inbound frame that carried an ack id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    /// Correlation id from the client frame
    pub ack: u64,
    /// Error string for a failed request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Status note for a successful request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AckPayload {
    /// Ack with no error and no status.
    pub fn ok(ack: u64) -> Self {
        Self {
            ack,
            error: None,
            status: None,
        }
    }

    /// Ack carrying a status note.
    pub fn status(ack: u64, status: impl Into<String>) -> Self {
        Self {
            ack,
            error: None,
            status: Some(status.into()),
        }
    }

    /// Ack carrying an error string.
    pub fn error(ack: u64, error: impl Into<String>) -> Self {
        Self {
            ack,
            error: Some(error.into()),
            status: None,
        }
    }
}
