//! Error types for the room layer.

use rolecall_protocol::RoomId;
use rolecall_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room already holds one member per role.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// Another member already uses this nickname.
    #[error("nickname {0:?} is already taken")]
    NicknameConflict(String),

    /// A non-host member attempted a host-only action.
    #[error("only the host may do that")]
    Unauthorized,

    /// `start` was requested with fewer members than configured.
    #[error("need at least {required} players, room has {present}")]
    NotEnoughPlayers { required: usize, present: usize },

    /// The connection is not a member of this room.
    #[error("{0} is not in room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// The room's actor has shut down (room removed or disbanded).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// Text for the `error` frame sent to the offending client.
    pub fn client_message(&self) -> String {
        match self {
            Self::RoomFull(_) => "room full".into(),
            Self::NicknameConflict(_) => "nickname taken".into(),
            Self::Unauthorized => "host only".into(),
            Self::NotEnoughPlayers { required, .. } => {
                format!("need at least {required} players")
            }
            Self::NotInRoom(..) | Self::Unavailable(_) => {
                "room unavailable".into()
            }
        }
    }

    /// Whether the connection must be closed after reporting this error.
    ///
    /// Join rejections end the connection; refused actions don't.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Self::RoomFull(_) | Self::NicknameConflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        assert_eq!(
            RoomError::RoomFull(RoomId::from("a")).client_message(),
            "room full"
        );
        assert_eq!(
            RoomError::NicknameConflict("bo".into()).client_message(),
            "nickname taken"
        );
        assert_eq!(RoomError::Unauthorized.client_message(), "host only");
        assert_eq!(
            RoomError::NotEnoughPlayers { required: 5, present: 2 }
                .client_message(),
            "need at least 5 players"
        );
    }

    #[test]
    fn test_only_join_rejections_close() {
        assert!(RoomError::RoomFull(RoomId::from("a")).closes_connection());
        assert!(RoomError::NicknameConflict("x".into()).closes_connection());
        assert!(!RoomError::Unauthorized.closes_connection());
        assert!(
            !RoomError::NotEnoughPlayers { required: 2, present: 1 }
                .closes_connection()
        );
    }
}
