//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust types and raw frame bytes. The session
//! layer only needs something that implements [`Codec`]; browsers speak
//! JSON, so [`JsonCodec`] is what the server uses.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec value is shared by every
/// connection task for the life of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use rolecall_protocol::{ClientAction, Codec, JsonCodec, Role, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let bytes = codec.encode(&ServerMessage::Assigned { role: Role::Mage }).unwrap();
/// assert_eq!(bytes, br#"{"type":"result","role":"Mage"}"#);
///
/// let action: ClientAction = codec.decode(br#"{"action":"start"}"#).unwrap();
/// assert_eq!(action, ClientAction::Start);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientAction, ServerMessage};

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientAction, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_produces_single_json_object() {
        let bytes = JsonCodec.encode(&ServerMessage::BecomeHost).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.is_object());
        assert_eq!(value["type"], "become_host");
    }
}
