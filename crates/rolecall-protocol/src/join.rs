//! Parsing the connection target into a join request.

use url::Url;

use crate::{ProtocolError, RoomId};

/// Path prefix every room endpoint lives under.
const ROOM_PATH_PREFIX: &str = "ws";

/// What a client asked for when it connected: `/ws/{room_id}?nickname=..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: RoomId,
    /// Trimmed and non-empty when present.
    pub nickname: Option<String>,
}

impl JoinRequest {
    /// Parses a request target (path plus optional query).
    ///
    /// The room segment is percent-decoded. A `nickname` query parameter
    /// that is empty or only whitespace counts as absent.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidTarget`] unless the path is exactly
    /// `/ws/{room_id}` with a non-empty room id.
    pub fn from_target(target: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidTarget(target.to_owned());

        let base = Url::parse("ws://rolecall.invalid/").map_err(|_| invalid())?;
        let url = base.join(target).map_err(|_| invalid())?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();
        let raw_room = match segments.as_slice() {
            [prefix, room] if *prefix == ROOM_PATH_PREFIX && !room.is_empty() => *room,
            _ => return Err(invalid()),
        };
        let room = urlencoding::decode(raw_room).map_err(|_| invalid())?;

        let nickname = url
            .query_pairs()
            .find(|(key, _)| key == "nickname")
            .map(|(_, value)| value.trim().to_owned())
            .filter(|name| !name.is_empty());

        Ok(Self {
            room_id: RoomId(room.into_owned()),
            nickname,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_room_path() {
        let req = JoinRequest::from_target("/ws/R1").unwrap();
        assert_eq!(req.room_id, RoomId::from("R1"));
        assert_eq!(req.nickname, None);
    }

    #[test]
    fn test_room_segment_is_percent_decoded() {
        let req = JoinRequest::from_target("/ws/%E6%88%BF%E9%97%B41").unwrap();
        assert_eq!(req.room_id.as_str(), "房间1");
    }

    #[test]
    fn test_nickname_is_decoded_and_trimmed() {
        let req =
            JoinRequest::from_target("/ws/R1?nickname=%20Ann+Lee%20").unwrap();
        assert_eq!(req.nickname.as_deref(), Some("Ann Lee"));
    }

    #[test]
    fn test_blank_nickname_is_absent() {
        let req = JoinRequest::from_target("/ws/R1?nickname=++").unwrap();
        assert_eq!(req.nickname, None);
        let req = JoinRequest::from_target("/ws/R1?nickname=").unwrap();
        assert_eq!(req.nickname, None);
    }

    #[test]
    fn test_other_query_params_are_ignored() {
        let req = JoinRequest::from_target("/ws/R1?v=2&nickname=bo").unwrap();
        assert_eq!(req.nickname.as_deref(), Some("bo"));
    }

    #[test]
    fn test_wrong_paths_are_rejected() {
        for target in ["/", "/ws", "/ws/", "/rooms/R1", "/ws/R1/extra"] {
            assert!(
                matches!(
                    JoinRequest::from_target(target),
                    Err(ProtocolError::InvalidTarget(_))
                ),
                "{target} should be rejected"
            );
        }
    }
}
