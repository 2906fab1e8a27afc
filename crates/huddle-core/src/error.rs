//! Error types for the relay core.

use thiserror::Error;

/// Relay errors surfaced to the originating connection.
///
/// Every variant is terminal at the handler boundary: it is reported back
/// through the acknowledgment channel and never propagates further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Join payload had an empty username or room after trimming.
    #[error("username and room are required")]
    FieldsRequired,

    /// Another user in the room already holds this name.
    #[error("username is in use")]
    UsernameInUse,

    /// The connection already joined a room and may not join again.
    #[error("already joined a room")]
    AlreadyJoined,

    /// Message text was rejected by the content filter.
    #[error("Profanity is not allowed")]
    ProfanityRejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_strings_match_wire_contract() {
        assert_eq!(
            RelayError::FieldsRequired.to_string(),
            "username and room are required"
        );
        assert_eq!(RelayError::UsernameInUse.to_string(), "username is in use");
        assert_eq!(
            RelayError::ProfanityRejected.to_string(),
            "Profanity is not allowed"
        );
    }
}
