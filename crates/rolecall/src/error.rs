//! Unified error type for Rolecall.

use rolecall_protocol::ProtocolError;
use rolecall_room::RoomError;
use rolecall_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors inside the session and server code.
#[derive(Debug, thiserror::Error)]
pub enum RolecallError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad connection target).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, nickname taken, host only).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let rolecall_err: RolecallError = err.into();
        assert!(matches!(rolecall_err, RolecallError::Transport(_)));
        assert!(rolecall_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidTarget("/nope".into());
        let rolecall_err: RolecallError = err.into();
        assert!(matches!(rolecall_err, RolecallError::Protocol(_)));
        assert!(rolecall_err.to_string().contains("/nope"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::RoomFull(rolecall_protocol::RoomId::from("R1"));
        let rolecall_err: RolecallError = err.into();
        assert!(matches!(rolecall_err, RolecallError::Room(_)));
        assert!(rolecall_err.to_string().contains("R1"));
    }
}
