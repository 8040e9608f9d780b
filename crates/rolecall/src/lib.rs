//! # Rolecall
//!
//! Realtime room coordinator that deals unique roles over WebSocket.
//!
//! Clients connect to `/ws/{room_id}` (optionally `?nickname=...`). The
//! first member of a room is its host; the host's `start` action deals a
//! random, non-repeating set of roles, one private `result` per member.
//! Hosts hand over to the longest-standing member when they leave, and
//! a room disappears when its last member goes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rolecall::prelude::*;
//!
//! # async fn run() -> Result<(), RolecallError> {
//! let server = RolecallServer::builder()
//!     .bind("0.0.0.0:8000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::RolecallError;
pub use server::{RolecallServer, RolecallServerBuilder, ServerState};

/// Common imports for running and testing a Rolecall server.
pub mod prelude {
    pub use crate::{
        RolecallError, RolecallServer, RolecallServerBuilder, ServerState,
    };
    pub use rolecall_protocol::{
        ClientAction, Codec, JsonCodec, Role, RoomId, ServerMessage,
    };
    pub use rolecall_room::{RoomConfig, RoomError};
    pub use rolecall_transport::{
        Connection, ConnectionId, MemoryConnection, MemoryPeer,
    };
}
