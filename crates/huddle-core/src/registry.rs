//! Connection-to-user registry.
//!
//! The registry is the single shared mutable resource of the relay: it
//! maps transient connection identifiers to joined-user state and enforces
//! per-room username uniqueness. Mutations hold the write lock for the
//! whole check-then-mutate step; no lock is held across transport awaits.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::RelayError;

/// Opaque identifier for one live connection, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Allocate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One joined participant.
///
/// Created on successful join, immutable afterwards, destroyed on
/// disconnect or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Connection this user joined from
    pub connection_id: ConnectionId,
    /// Display name, trimmed; unique per room, case-insensitive
    pub username: String,
    /// Room name, trimmed
    pub room: String,
}

/// Registry of all currently-joined users, keyed by connection id.
#[derive(Debug, Default)]
pub struct UserRegistry {
    users: RwLock<HashMap<ConnectionId, User>>,
}

impl UserRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user for a connection.
    ///
    /// `username` and `room` are trimmed before validation. The uniqueness
    /// check and the insertion run under a single write-lock acquisition,
    /// so two racing joins for the same room and name cannot both succeed.
    /// A connection that already joined is rejected rather than
    /// overwritten.
    #[instrument(skip(self), fields(connection = %connection_id))]
    pub async fn add_user(
        &self,
        connection_id: ConnectionId,
        username: &str,
        room: &str,
    ) -> Result<User, RelayError> {
        let username = username.trim();
        let room = room.trim();
        if username.is_empty() || room.is_empty() {
            return Err(RelayError::FieldsRequired);
        }

        let mut users = self.users.write().await;

        if users.contains_key(&connection_id) {
            return Err(RelayError::AlreadyJoined);
        }

        let name_lower = username.to_lowercase();
        let taken = users
            .values()
            .any(|u| u.room == room && u.username.to_lowercase() == name_lower);
        if taken {
            return Err(RelayError::UsernameInUse);
        }

        let user = User {
            connection_id,
            username: username.to_string(),
            room: room.to_string(),
        };
        users.insert(connection_id, user.clone());
        debug!(user = %user.username, room = %user.room, "User registered");
        Ok(user)
    }

    /// Remove and return the user for a connection.
    ///
    /// Absent is a normal path: disconnect-before-join is not an error.
    #[instrument(skip(self), fields(connection = %connection_id))]
    pub async fn remove_user(&self, connection_id: ConnectionId) -> Option<User> {
        let removed = self.users.write().await.remove(&connection_id);
        match &removed {
            Some(user) => debug!(user = %user.username, room = %user.room, "User removed"),
            None => debug!("Connection had no registered user"),
        }
        removed
    }

    /// Look up the user for a connection.
    pub async fn get_user(&self, connection_id: ConnectionId) -> Option<User> {
        self.users.read().await.get(&connection_id).cloned()
    }

    /// Usernames of every user in `room`, in no significant order.
    ///
    /// An unknown room yields an empty vec.
    pub async fn users_in_room(&self, room: &str) -> Vec<String> {
        self.users
            .read()
            .await
            .values()
            .filter(|u| u.room == room)
            .map(|u| u.username.clone())
            .collect()
    }

    /// Connection ids of every user in `room`.
    ///
    /// Broadcast targets are resolved from here at send time, so a
    /// connection removed mid-flight is simply absent from the target set.
    pub async fn connections_in_room(&self, room: &str) -> Vec<ConnectionId> {
        self.users
            .read()
            .await
            .values()
            .filter(|u| u.room == room)
            .map(|u| u.connection_id)
            .collect()
    }

    /// Number of currently-joined users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}
