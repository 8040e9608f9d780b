//! Wire protocol for Rolecall.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ServerMessage`], [`ClientAction`], [`Role`], [`RoomId`]):
//!   the message structures that travel on the wire.
//! - **Join requests** ([`JoinRequest`]): the room id and optional
//!   nickname a client encodes in its connection target.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about connections or room state; it
//! only knows how to read and write messages.
//!
//! ```text
//! Transport (bytes) → Protocol (ServerMessage / ClientAction) → Room
//! ```

mod codec;
mod error;
mod join;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use join::JoinRequest;
pub use types::{ClientAction, Role, RoomId, ServerMessage};
