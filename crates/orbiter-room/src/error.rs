//! Error types for the room layer.

use orbiter_protocol::PlayerId;

/// Errors that can occur during room operations.
///
/// All of these are local, recoverable conditions reported back to the
/// requesting client. A failed operation leaves room state untouched.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room name is empty or whitespace-only.
    #[error("room name must not be empty")]
    InvalidName,

    /// No room with this name exists.
    #[error("room {0:?} not found")]
    UnknownRoom(String),

    /// The player is not currently in the room.
    #[error("player {0} is not in the room")]
    UnknownPlayer(PlayerId),

    /// Someone other than the host tried to start a round.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// A round is already in flight for this room.
    #[error("a round is already running")]
    AlreadyRunning,

    /// The room's command channel is closed (actor shut down).
    #[error("room {0:?} is unavailable")]
    Unavailable(String),
}
