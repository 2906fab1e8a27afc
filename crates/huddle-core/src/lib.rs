//! # huddle-core
//!
//! Protocol library for the Huddle chat relay.
//!
//! Clients join named rooms over persistent connections, exchange text and
//! location messages, and receive membership notifications. This crate
//! owns the connection-to-user registry, the derived room membership view,
//! and the event router; the network transport lives in `huddle-server`
//! and reaches the core only through the [`ConnectionGroup`] capabilities.
//!
//! ## Architecture
//!
//! - **Registry**: connection id to `{username, room}` state, with
//!   per-room case-insensitive username uniqueness
//! - **Room view**: membership snapshots recomputed from the registry on
//!   demand
//! - **Event Router**: validates inbound events, mutates the registry, and
//!   fans out to one connection, a room, or a room minus the sender

pub mod events;
pub mod filter;
pub mod message;
pub mod registry;
pub mod rooms;
pub mod router;
pub mod transport;

mod error;

pub use error::RelayError;
pub use events::{AckPayload, ClientEvent, ClientFrame, ServerEvent};
pub use message::{ChatMessage, LocationMessage, SYSTEM_USERNAME};
pub use registry::{ConnectionId, User, UserRegistry};
pub use rooms::RoomSnapshot;
pub use router::{EventRouter, RelayOutcome, DELIVERED_STATUS, NOT_JOINED_NOTICE, WELCOME_TEXT};
pub use transport::ConnectionGroup;
