//! Room actor: an isolated Tokio task that owns one room's membership.
//!
//! Each room runs in its own task and processes [`RoomCommand`]s one at a
//! time, so join, leave, host hand-off, dealing and disband are each
//! applied atomically with respect to every other session in the room.
//! Members receive messages through unbounded channels, which means the
//! actor never waits on a client's network I/O.

use std::sync::atomic::{AtomicU64, Ordering};

use rolecall_protocol::{RoomId, ServerMessage};
use rolecall_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError, roles};

/// Counter distinguishing room instances that reuse the same id.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Command channel size for room actors.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Something the room wants a member's session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Forward this message to the client.
    Message(ServerMessage),
    /// Close the client's connection (the room was disbanded).
    Close,
}

/// Channel sender for delivering outbound items to a member's session.
pub type MemberSender = mpsc::UnboundedSender<Outbound>;

/// Result of a best-effort delivery to one member.
///
/// A dropped delivery means the member's session is already gone; its
/// own cleanup will correct the membership, so callers discard this.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
}

/// What a successful join assigned to the new member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub player_id: String,
    pub is_host: bool,
}

/// What happened to the room when a member left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The last member left; the room must be removed.
    Emptied,
    /// Members remain. `promoted` names the new host if the host left.
    Remaining { promoted: Option<String> },
}

/// A snapshot of room membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    /// Display names in join order.
    pub players: Vec<String>,
    pub host: Option<String>,
    pub capacity: usize,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel.
pub(crate) enum RoomCommand {
    Join {
        conn: ConnectionId,
        nickname: Option<String>,
        sender: MemberSender,
        reply: oneshot::Sender<Result<Joined, RoomError>>,
    },
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },
    Start {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },
    Disband {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Sessions keep one for the lifetime of their membership;
/// [`instance`](Self::instance) tells a handle apart from a later room
/// created under the same id.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    instance: u64,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Returns the process-unique instance number of this room.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Asks the room to admit a member.
    pub async fn join(
        &self,
        conn: ConnectionId,
        nickname: Option<String>,
        sender: MemberSender,
    ) -> Result<Joined, RoomError> {
        self.request(|reply| RoomCommand::Join {
            conn,
            nickname,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a member, handing host over if needed.
    pub async fn leave(
        &self,
        conn: ConnectionId,
    ) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Leave { conn, reply }).await?
    }

    /// Deals roles on behalf of `conn`. Returns how many were dealt.
    pub async fn start(&self, conn: ConnectionId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Start { conn, reply }).await?
    }

    /// Notifies and closes every member except the host.
    ///
    /// Only the room's bookkeeping for the other members is affected; the
    /// caller is responsible for removing the room from the registry.
    pub(crate) async fn disband(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Disband { conn, reply }).await?
    }

    /// Requests a membership snapshot.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to stop.
    pub(crate) async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// One admitted connection.
struct Member {
    conn: ConnectionId,
    name: String,
    sender: MemberSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    /// Join order; the host hand-off picks the front.
    members: Vec<Member>,
    host: Option<ConnectionId>,
    /// Next `PlayerN` label. Only ever increases.
    next_label: u64,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::debug!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    nickname,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn, nickname, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn, reply } => {
                    let _ = reply.send(self.handle_leave(conn));
                }
                RoomCommand::Start { conn, reply } => {
                    let _ = reply.send(self.handle_start(conn));
                }
                RoomCommand::Disband { conn, reply } => {
                    let _ = reply.send(self.handle_disband(conn));
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => break,
            }
        }

        tracing::debug!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        nickname: Option<String>,
        sender: MemberSender,
    ) -> Result<Joined, RoomError> {
        if self.members.len() >= self.config.capacity() {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        }
        let name = self.allocate_name(nickname)?;

        let is_host = self.members.is_empty();
        if is_host {
            self.host = Some(conn);
        }
        self.members.push(Member {
            conn,
            name: name.clone(),
            sender,
        });
        tracing::info!(
            room_id = %self.room_id,
            %conn,
            player = %name,
            is_host,
            players = self.members.len(),
            "player joined"
        );

        let welcome = ServerMessage::Welcome {
            player_id: name.clone(),
            is_host,
        };
        if let Some(member) = self.members.last() {
            let _ = Self::send_to(member, welcome);
        }
        self.broadcast_update();

        Ok(Joined {
            player_id: name,
            is_host,
        })
    }

    fn handle_leave(
        &mut self,
        conn: ConnectionId,
    ) -> Result<Departure, RoomError> {
        let index = self
            .members
            .iter()
            .position(|m| m.conn == conn)
            .ok_or_else(|| RoomError::NotInRoom(conn, self.room_id.clone()))?;
        let departed = self.members.remove(index);

        tracing::info!(
            room_id = %self.room_id,
            %conn,
            player = %departed.name,
            players = self.members.len(),
            "player left"
        );

        if self.members.is_empty() {
            self.host = None;
            return Ok(Departure::Emptied);
        }

        let mut promoted = None;
        if self.host == Some(conn) {
            let successor = &self.members[0];
            self.host = Some(successor.conn);
            tracing::info!(
                room_id = %self.room_id,
                player = %successor.name,
                "host handed over"
            );
            let _ = Self::send_to(successor, ServerMessage::BecomeHost);
            promoted = Some(successor.name.clone());
        }
        self.broadcast_update();

        Ok(Departure::Remaining { promoted })
    }

    fn handle_start(&mut self, conn: ConnectionId) -> Result<usize, RoomError> {
        self.authorize_host(conn)?;

        let present = self.members.len();
        let required = self.config.start_threshold();
        if present < required {
            return Err(RoomError::NotEnoughPlayers { required, present });
        }

        let dealt = roles::deal(present, &mut rand::rng());
        for (member, role) in self.members.iter().zip(dealt) {
            let _ = Self::send_to(member, ServerMessage::Assigned { role });
        }
        tracing::info!(room_id = %self.room_id, players = present, "roles dealt");
        Ok(present)
    }

    fn handle_disband(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.authorize_host(conn)?;

        // The host's own connection stays open; its client navigates away.
        for member in self.members.iter().filter(|m| m.conn != conn) {
            let _ = Self::send_to(member, ServerMessage::Destroyed);
            let _ = Self::send_outbound(member, Outbound::Close);
        }
        tracing::info!(
            room_id = %self.room_id,
            players = self.members.len(),
            "room disbanded by host"
        );
        self.members.clear();
        self.host = None;
        Ok(())
    }

    fn authorize_host(&self, conn: ConnectionId) -> Result<(), RoomError> {
        if !self.is_member(conn) {
            return Err(RoomError::NotInRoom(conn, self.room_id.clone()));
        }
        if self.host != Some(conn) {
            tracing::debug!(
                room_id = %self.room_id,
                %conn,
                "host-only action refused"
            );
            return Err(RoomError::Unauthorized);
        }
        Ok(())
    }

    /// Validates a nickname or generates the next free `PlayerN` label.
    fn allocate_name(
        &mut self,
        nickname: Option<String>,
    ) -> Result<String, RoomError> {
        if let Some(nickname) = nickname {
            if self.name_taken(&nickname) {
                return Err(RoomError::NicknameConflict(nickname));
            }
            return Ok(nickname);
        }
        // Skip labels a member already chose as a nickname.
        loop {
            let label = format!("Player{}", self.next_label);
            self.next_label += 1;
            if !self.name_taken(&label) {
                return Ok(label);
            }
        }
    }

    fn name_taken(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    fn is_member(&self, conn: ConnectionId) -> bool {
        self.members.iter().any(|m| m.conn == conn)
    }

    fn name_of(&self, conn: ConnectionId) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.conn == conn)
            .map(|m| m.name.as_str())
    }

    fn host_name(&self) -> Option<&str> {
        self.host.and_then(|host| self.name_of(host))
    }

    /// Sends the member list and host to everyone.
    fn broadcast_update(&self) {
        let update = ServerMessage::Update {
            players: self.members.iter().map(|m| m.name.clone()).collect(),
            host: self.host_name().unwrap_or_default().to_owned(),
        };
        for member in &self.members {
            let _ = Self::send_to(member, update.clone());
        }
    }

    fn send_to(member: &Member, msg: ServerMessage) -> Delivery {
        Self::send_outbound(member, Outbound::Message(msg))
    }

    fn send_outbound(member: &Member, item: Outbound) -> Delivery {
        match member.sender.send(item) {
            Ok(()) => Delivery::Delivered,
            Err(_) => {
                tracing::debug!(
                    conn = %member.conn,
                    player = %member.name,
                    "delivery dropped, session gone"
                );
                Delivery::Dropped
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            players: self.members.iter().map(|m| m.name.clone()).collect(),
            host: self.host_name().map(str::to_owned),
            capacity: self.config.capacity(),
        }
    }
}

/// Spawns a new, empty room actor and returns a handle to it.
pub(crate) fn spawn_room(room_id: RoomId, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        members: Vec::new(),
        host: None,
        next_label: 1,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        instance,
        sender: tx,
    }
}
