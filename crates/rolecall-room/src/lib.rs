//! Room lifecycle and membership for Rolecall.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its
//! member list, host and name counter. The registry maps room ids to
//! those actors and creates/removes rooms as members come and go.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: get-or-create, join, leave, disband, remove
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Outbound`]: what a room asks a member's session to deliver
//! - [`RoomConfig`]: capacity, start threshold, flavor
//! - [`roles`]: the role shuffler

mod config;
mod error;
mod registry;
pub mod roles;
mod room;

pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::{LeaveOutcome, Lookup, RoomRegistry};
pub use room::{
    Delivery, Departure, Joined, MemberSender, Outbound, RoomHandle, RoomInfo,
};
