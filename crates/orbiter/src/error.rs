//! Unified error type for the Orbiter server.

use orbiter_protocol::ProtocolError;
use orbiter_room::RoomError;
use orbiter_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum OrbiterError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (unknown room, not host, already running).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let orbiter_err: OrbiterError = err.into();
        assert!(matches!(orbiter_err, OrbiterError::Transport(_)));
        assert!(orbiter_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let orbiter_err: OrbiterError = err.into();
        assert!(matches!(orbiter_err, OrbiterError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::AlreadyRunning;
        let orbiter_err: OrbiterError = err.into();
        assert!(matches!(orbiter_err, OrbiterError::Room(_)));
    }
}
