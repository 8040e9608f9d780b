//! Room registry: maps room ids to running room actors.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is not thread-safe by itself; it is a plain `HashMap`.
//! The server keeps it behind one `tokio::sync::Mutex` and calls the
//! compound transitions ([`join`](RoomRegistry::join),
//! [`leave`](RoomRegistry::leave), [`disband`](RoomRegistry::disband))
//! while holding the lock. Each of those awaits a single room actor
//! round-trip and no network I/O, so creating, emptying and removing a
//! room can never interleave with a concurrent join to the same id.

use std::collections::HashMap;

use rolecall_protocol::RoomId;
use rolecall_transport::ConnectionId;

use crate::room::spawn_room;
use crate::{Departure, Joined, MemberSender, RoomConfig, RoomError, RoomHandle};

/// Outcome of [`RoomRegistry::get_or_create`].
#[derive(Debug, Clone)]
pub enum Lookup {
    /// No room had this id; a fresh, empty one was started.
    Created(RoomHandle),
    /// The room already existed.
    Existing(RoomHandle),
}

impl Lookup {
    /// The room handle, whichever way it was obtained.
    pub fn handle(&self) -> &RoomHandle {
        match self {
            Self::Created(handle) | Self::Existing(handle) => handle,
        }
    }

    /// Returns `true` if the room was created by this lookup.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// What [`RoomRegistry::leave`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The room instance was already gone (disbanded or replaced).
    RoomGone,
    /// The member was the last one; the room was removed.
    RoomClosed,
    /// The member left; `promoted` names the new host if there is one.
    Left { promoted: Option<String> },
}

/// Process-wide map from room id to room actor.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    config: RoomConfig,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms all use `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Returns the room for `room_id`, starting an empty one if needed.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> Lookup {
        if let Some(handle) = self.rooms.get(room_id) {
            return Lookup::Existing(handle.clone());
        }
        let handle = spawn_room(room_id.clone(), self.config.clone());
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, instance = handle.instance(), "room created");
        Lookup::Created(handle)
    }

    /// Deletes the room entry and stops its actor.
    ///
    /// Returns `false` if no such room exists.
    pub async fn remove(&mut self, room_id: &RoomId) -> bool {
        let Some(handle) = self.rooms.remove(room_id) else {
            return false;
        };
        if let Err(e) = handle.shutdown().await {
            tracing::debug!(%room_id, error = %e, "room actor already stopped");
        }
        tracing::info!(%room_id, "room removed");
        true
    }

    /// Admits `conn` into `room_id`, creating the room on first join.
    ///
    /// On success the member has already been sent `welcome` and every
    /// member an `update`, through their senders.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] or [`RoomError::NicknameConflict`]; the
    /// member is not added.
    pub async fn join(
        &mut self,
        room_id: &RoomId,
        conn: ConnectionId,
        nickname: Option<String>,
        sender: MemberSender,
    ) -> Result<(RoomHandle, Joined), RoomError> {
        let lookup = self.get_or_create(room_id);
        let result = lookup.handle().join(conn, nickname, sender).await;

        match result {
            Ok(joined) => Ok((lookup.handle().clone(), joined)),
            Err(e) => {
                // A room nobody got into must not linger.
                if lookup.is_created() {
                    self.remove(room_id).await;
                }
                Err(e)
            }
        }
    }

    /// Removes `conn` from the room behind `handle`.
    ///
    /// Does nothing if that room instance is no longer registered. Removes
    /// the room when its last member leaves.
    pub async fn leave(
        &mut self,
        handle: &RoomHandle,
        conn: ConnectionId,
    ) -> Result<LeaveOutcome, RoomError> {
        if !self.is_current(handle) {
            return Ok(LeaveOutcome::RoomGone);
        }
        match handle.leave(conn).await? {
            Departure::Emptied => {
                self.remove(handle.room_id()).await;
                Ok(LeaveOutcome::RoomClosed)
            }
            Departure::Remaining { promoted } => {
                Ok(LeaveOutcome::Left { promoted })
            }
        }
    }

    /// Disbands the room on behalf of its host and removes it.
    ///
    /// # Errors
    /// [`RoomError::Unauthorized`] if `conn` is not the host, in which
    /// case nothing changes. [`RoomError::Unavailable`] if the room
    /// instance is no longer registered.
    pub async fn disband(
        &mut self,
        handle: &RoomHandle,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        if !self.is_current(handle) {
            return Err(RoomError::Unavailable(handle.room_id().clone()));
        }
        handle.disband(conn).await?;
        self.remove(handle.room_id()).await;
        Ok(())
    }

    /// Returns `true` if `handle` is the room currently registered under
    /// its id, not an older instance that was removed.
    pub fn is_current(&self, handle: &RoomHandle) -> bool {
        self.rooms
            .get(handle.room_id())
            .is_some_and(|h| h.instance() == handle.instance())
    }

    /// Returns the handle for `room_id`, if the room exists.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Returns `true` if a room with this id exists.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room ids.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
