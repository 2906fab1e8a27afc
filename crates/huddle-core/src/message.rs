//! Outbound message payloads.
//!
//! Messages are constructed at emit time and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved sender name for server-generated notices.
pub const SYSTEM_USERNAME: &str = "System";

/// A text message relayed to one or more connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Sender name, or [`SYSTEM_USERNAME`] for server notices
    pub username: String,
    /// Message body
    pub text: String,
    /// Emit timestamp (Unix milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    pub fn new(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a server notice from [`SYSTEM_USERNAME`].
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(SYSTEM_USERNAME, text)
    }
}

/// A shared location relayed as a maps link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMessage {
    /// Sender name
    pub username: String,
    /// Maps URL encoding the coordinates
    pub url: String,
    /// Emit timestamp (Unix milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl LocationMessage {
    /// Create a location message for the given coordinates.
    pub fn new(username: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            username: username.into(),
            url: format!("https://google.com/maps?q={latitude},{longitude}"),
            created_at: Utc::now(),
        }
    }
}
