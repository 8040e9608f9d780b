//! Core protocol types for Rolecall's wire format.
//!
//! Every type here travels on the wire. Shapes are fixed by the browser
//! client: server messages carry a `type` tag, client messages an
//! `action` tag, both snake_case.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The name of a room, taken verbatim from the connection path.
///
/// Opaque to the server: two clients are in the same room exactly when
/// their ids compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// One of the fixed roles dealt to room members.
///
/// Declaration order is significant: a room with `n` members is dealt
/// the first `n` entries of [`Role::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Assassin,
    Mage,
    Marksman,
    Support,
    Warrior,
}

impl Role {
    /// Every role, in dealing order.
    pub const ALL: [Role; 5] = [
        Role::Assassin,
        Role::Mage,
        Role::Marksman,
        Role::Support,
        Role::Warrior,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Assassin => "Assassin",
            Self::Mage => "Mage",
            Self::Marksman => "Marksman",
            Self::Support => "Support",
            Self::Warrior => "Warrior",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ServerMessage: server → client
// ---------------------------------------------------------------------------

/// Messages the server sends to a client.
///
/// Internally tagged, so `BecomeHost` is `{"type":"become_host"}` and
/// `Welcome` is `{"type":"welcome","player_id":"Player1","is_host":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, right after a successful join.
    Welcome { player_id: String, is_host: bool },

    /// A rejected join or action. `msg` is human readable.
    Error { msg: String },

    /// The full member list (join order) and the current host's name.
    /// Sent after any membership or host change.
    Update { players: Vec<String>, host: String },

    /// The recipient's privately dealt role.
    #[serde(rename = "result")]
    Assigned { role: Role },

    /// The host disbanded the room; the connection is about to close.
    Destroyed,

    /// The recipient was promoted to host.
    BecomeHost,
}

impl ServerMessage {
    /// Shorthand for an [`Error`](Self::Error) message.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { msg: msg.into() }
    }
}

// ---------------------------------------------------------------------------
// ClientAction: client → server
// ---------------------------------------------------------------------------

/// Actions a client can send, e.g. `{"action":"start"}`.
///
/// Any `action` value the server doesn't know decodes as
/// [`Unknown`](Self::Unknown) and is ignored, so newer clients can talk
/// to older servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Host asks for roles to be dealt.
    Start,
    /// Voluntary departure.
    Leave,
    /// Host disbands the room.
    Destroy,
    #[serde(other)]
    Unknown,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these exact JSON shapes, so each test
    //! pins one of them.

    use super::*;
    use serde_json::json;

    fn to_json(msg: &ServerMessage) -> serde_json::Value {
        serde_json::to_value(msg).unwrap()
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::from("R1")).unwrap();
        assert_eq!(json, "\"R1\"");
        assert_eq!(RoomId::from("R1").to_string(), "R1");
    }

    #[test]
    fn test_role_all_is_in_dealing_order() {
        let names: Vec<String> =
            Role::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["Assassin", "Mage", "Marksman", "Support", "Warrior"]
        );
    }

    #[test]
    fn test_role_serializes_as_name() {
        assert_eq!(serde_json::to_value(Role::Marksman).unwrap(), "Marksman");
    }

    #[test]
    fn test_welcome_json_format() {
        let msg = ServerMessage::Welcome {
            player_id: "Player1".into(),
            is_host: true,
        };
        assert_eq!(
            to_json(&msg),
            json!({"type": "welcome", "player_id": "Player1", "is_host": true})
        );
    }

    #[test]
    fn test_error_json_format() {
        assert_eq!(
            to_json(&ServerMessage::error("room full")),
            json!({"type": "error", "msg": "room full"})
        );
    }

    #[test]
    fn test_update_json_format() {
        let msg = ServerMessage::Update {
            players: vec!["Player1".into(), "Player2".into()],
            host: "Player1".into(),
        };
        assert_eq!(
            to_json(&msg),
            json!({
                "type": "update",
                "players": ["Player1", "Player2"],
                "host": "Player1",
            })
        );
    }

    #[test]
    fn test_assigned_is_tagged_result() {
        let msg = ServerMessage::Assigned { role: Role::Support };
        assert_eq!(to_json(&msg), json!({"type": "result", "role": "Support"}));
    }

    #[test]
    fn test_unit_messages_json_format() {
        assert_eq!(
            to_json(&ServerMessage::Destroyed),
            json!({"type": "destroyed"})
        );
        assert_eq!(
            to_json(&ServerMessage::BecomeHost),
            json!({"type": "become_host"})
        );
    }

    #[test]
    fn test_client_actions_decode() {
        let start: ClientAction =
            serde_json::from_str(r#"{"action":"start"}"#).unwrap();
        let leave: ClientAction =
            serde_json::from_str(r#"{"action":"leave"}"#).unwrap();
        let destroy: ClientAction =
            serde_json::from_str(r#"{"action":"destroy"}"#).unwrap();
        assert_eq!(start, ClientAction::Start);
        assert_eq!(leave, ClientAction::Leave);
        assert_eq!(destroy, ClientAction::Destroy);
    }

    #[test]
    fn test_unrecognized_action_decodes_as_unknown() {
        let action: ClientAction =
            serde_json::from_str(r#"{"action":"dance","speed":9}"#).unwrap();
        assert_eq!(action, ClientAction::Unknown);
    }

    #[test]
    fn test_missing_action_tag_is_error() {
        let result: Result<ClientAction, _> =
            serde_json::from_str(r#"{"type":"start"}"#);
        assert!(result.is_err());
    }
}
