//! Error types for lobby operations.

use muster_protocol::{PlayerId, RoomId};

/// Errors that can occur while mutating lobby state.
///
/// The display strings of the reportable variants go to clients verbatim
/// inside an `error` envelope, so they are phrased for players, not
/// operators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The named room is not in the directory.
    #[error("Game not found")]
    RoomNotFound(RoomId),

    /// The room has a password and the supplied one didn't match
    /// (case-sensitive, plaintext compare).
    #[error("Wrong password")]
    WrongPassword,

    /// The room already holds its maximum membership.
    #[error("Game full")]
    RoomFull,

    /// The acting player is not in the registry.
    #[error("Player not registered")]
    PlayerNotFound(PlayerId),

    /// The acting player is already bound to a room and must leave it
    /// before creating or joining another.
    #[error("Already in a game")]
    AlreadyInRoom(RoomId),
}

impl LobbyError {
    /// Whether this error is reported back to the requester.
    ///
    /// Not-found conditions are silent no-ops: the requester observes
    /// nothing, and nothing is disclosed about what exists.
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::WrongPassword | Self::RoomFull | Self::AlreadyInRoom(_) => {
                true
            }
            Self::RoomNotFound(_) | Self::PlayerNotFound(_) => false,
        }
    }
}
