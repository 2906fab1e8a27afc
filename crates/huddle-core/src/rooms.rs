//! Derived room membership view.

use serde::{Deserialize, Serialize};

use crate::registry::UserRegistry;

/// Membership snapshot for one room.
///
/// Recomputed from the registry on every capture and never cached, so it
/// cannot go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room name
    pub room: String,
    /// Usernames currently joined
    pub users: Vec<String>,
}

impl RoomSnapshot {
    /// Capture the current membership of `room`.
    pub async fn capture(registry: &UserRegistry, room: &str) -> Self {
        Self {
            room: room.to_string(),
            users: registry.users_in_room(room).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionId;

    #[tokio::test]
    async fn capture_reflects_current_membership() {
        let registry = UserRegistry::new();
        let a = ConnectionId::new();
        registry.add_user(a, "alice", "general").await.unwrap();
        registry
            .add_user(ConnectionId::new(), "bob", "general")
            .await
            .unwrap();

        let mut snapshot = RoomSnapshot::capture(&registry, "general").await;
        snapshot.users.sort();
        assert_eq!(snapshot.room, "general");
        assert_eq!(snapshot.users, vec!["alice", "bob"]);

        registry.remove_user(a).await;
        let snapshot = RoomSnapshot::capture(&registry, "general").await;
        assert_eq!(snapshot.users, vec!["bob"]);
    }

    #[tokio::test]
    async fn capture_of_empty_room_has_no_users() {
        let registry = UserRegistry::new();
        let snapshot = RoomSnapshot::capture(&registry, "general").await;
        assert!(snapshot.users.is_empty());
    }
}
