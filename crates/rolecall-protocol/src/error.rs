//! Error types for the protocol layer.
//!
//! Each crate in Rolecall defines its own error enum. A `ProtocolError`
//! always means the problem is in turning bytes or a request target into
//! typed messages, never in networking or room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `action` tag, or a
    /// truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The connection target does not name a room, e.g. `/` or
    /// `/ws/a/b` instead of `/ws/{room_id}`.
    #[error("invalid room target: {0}")]
    InvalidTarget(String),
}
