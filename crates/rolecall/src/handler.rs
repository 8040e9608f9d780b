//! Per-connection room session: join, action loop, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Parse `/ws/{room_id}?nickname=..` from the connection target
//!   2. Join the room through the registry (welcome + update are queued)
//!   3. Loop: forward room deliveries, dispatch client actions
//!   4. Leave the room unless it was destroyed underneath us

use std::sync::Arc;

use rolecall_protocol::{ClientAction, Codec, JoinRequest, ServerMessage};
use rolecall_room::{LeaveOutcome, Outbound, RoomError, RoomHandle};
use rolecall_transport::{Connection, ConnectionId, TransportError};
use tokio::sync::mpsc;

use crate::RolecallError;
use crate::server::ServerState;

/// Drop guard that removes a member from its room when the session exits.
///
/// The normal exit path calls [`release`](Self::release) and awaits the
/// cleanup. If the session errors out or panics instead, `Drop` spawns the
/// same cleanup as a fire-and-forget task, since it needs the async lock.
struct MembershipGuard<C: Codec> {
    conn_id: ConnectionId,
    handle: RoomHandle,
    state: Arc<ServerState<C>>,
    armed: bool,
}

impl<C: Codec> MembershipGuard<C> {
    /// Leaves the room now.
    async fn release(mut self) {
        self.armed = false;
        leave_room(&self.state, &self.handle, self.conn_id).await;
    }

    /// The room is already gone; there is nothing to leave.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<C: Codec> Drop for MembershipGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let handle = self.handle.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            leave_room(&state, &handle, conn_id).await;
        });
    }
}

async fn leave_room<C: Codec>(
    state: &ServerState<C>,
    handle: &RoomHandle,
    conn_id: ConnectionId,
) {
    let result = state.rooms.lock().await.leave(handle, conn_id).await;
    match result {
        Ok(LeaveOutcome::RoomGone) => {
            tracing::debug!(%conn_id, room_id = %handle.room_id(), "room already gone");
        }
        Ok(LeaveOutcome::RoomClosed) => {
            tracing::info!(room_id = %handle.room_id(), "last member left, room closed");
        }
        Ok(LeaveOutcome::Left { .. }) => {}
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "leave failed");
        }
    }
}

/// Why the action loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// Client closed the connection or the transport failed.
    Disconnected,
    /// Client sent `leave`.
    Left,
    /// This member, as host, destroyed the room.
    Destroyed,
    /// The host destroyed the room and the room closed us.
    Kicked,
}

/// Handles a single connection from accept to close.
pub(crate) async fn run_session<T, C>(
    conn: T,
    state: Arc<ServerState<C>>,
) -> Result<(), RolecallError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, path = conn.target(), "handling new connection");

    // --- Step 1: Parse the target ---
    let request = match JoinRequest::from_target(conn.target()) {
        Ok(request) => request,
        Err(e) => {
            send_error(&conn, &state.codec, "invalid room").await?;
            conn.close().await?;
            return Err(e.into());
        }
    };

    // --- Step 2: Join ---
    let (tx, mut rx) = mpsc::unbounded_channel();
    let joined = {
        let mut rooms = state.rooms.lock().await;
        rooms
            .join(&request.room_id, conn_id, request.nickname.clone(), tx)
            .await
    };
    let handle = match joined {
        Ok((handle, joined)) => {
            tracing::debug!(
                %conn_id,
                room_id = %request.room_id,
                player = %joined.player_id,
                "session joined room"
            );
            handle
        }
        Err(e) => {
            tracing::debug!(
                %conn_id,
                room_id = %request.room_id,
                error = %e,
                "join rejected"
            );
            send_error(&conn, &state.codec, e.client_message()).await?;
            conn.close().await?;
            return Err(e.into());
        }
    };

    let guard = MembershipGuard {
        conn_id,
        handle: handle.clone(),
        state: Arc::clone(&state),
        armed: true,
    };

    // --- Step 3: Action loop ---
    let exit = loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::debug!(%conn_id, "connection closed cleanly");
                        break Exit::Disconnected;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break Exit::Disconnected;
                    }
                };
                if let Some(exit) =
                    handle_frame(&conn, &state, &handle, &data).await?
                {
                    break exit;
                }
            }
            outbound = rx.recv() => match outbound {
                Some(Outbound::Message(msg)) => {
                    send_message(&conn, &state.codec, &msg).await?;
                }
                Some(Outbound::Close) | None => break Exit::Kicked,
            },
        }
    };

    // --- Step 4: Cleanup ---
    match exit {
        Exit::Disconnected => guard.release().await,
        Exit::Left => {
            guard.release().await;
            conn.close().await?;
        }
        Exit::Kicked => {
            guard.disarm();
            conn.close().await?;
        }
        Exit::Destroyed => {
            guard.disarm();
            // The host's client closes its own connection.
            while let Ok(Some(data)) = conn.recv().await {
                tracing::debug!(
                    %conn_id,
                    bytes = data.len(),
                    "ignoring frame after destroy"
                );
            }
        }
    }
    tracing::debug!(%conn_id, ?exit, "session ended");
    Ok(())
}

/// Decodes and dispatches one client frame.
///
/// Returns the loop exit if the action ends the session.
async fn handle_frame<T, C>(
    conn: &T,
    state: &Arc<ServerState<C>>,
    handle: &RoomHandle,
    data: &[u8],
) -> Result<Option<Exit>, RolecallError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    let conn_id = conn.id();
    let action: ClientAction = match state.codec.decode(data) {
        Ok(action) => action,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "ignoring undecodable frame");
            return Ok(None);
        }
    };
    let allow_disband = state.room_config.allow_disband;

    match action {
        ClientAction::Start => match handle.start(conn_id).await {
            Ok(_) => {}
            Err(
                e @ (RoomError::Unauthorized
                | RoomError::NotEnoughPlayers { .. }),
            ) => {
                send_error(conn, &state.codec, e.client_message()).await?;
            }
            // The room is going away; its close delivery ends the loop.
            Err(e) => tracing::debug!(%conn_id, error = %e, "start failed"),
        },
        ClientAction::Leave if allow_disband => return Ok(Some(Exit::Left)),
        ClientAction::Destroy if allow_disband => {
            let result = state.rooms.lock().await.disband(handle, conn_id).await;
            match result {
                Ok(()) => return Ok(Some(Exit::Destroyed)),
                Err(e @ RoomError::Unauthorized) => {
                    send_error(conn, &state.codec, e.client_message()).await?;
                }
                Err(e) => tracing::debug!(%conn_id, error = %e, "destroy failed"),
            }
        }
        ClientAction::Leave | ClientAction::Destroy | ClientAction::Unknown => {
            tracing::debug!(%conn_id, ?action, "ignoring action");
        }
    }
    Ok(None)
}

/// Encodes and sends one server message.
async fn send_message<T, C>(
    conn: &T,
    codec: &C,
    msg: &ServerMessage,
) -> Result<(), RolecallError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends an `error` frame to the client.
async fn send_error<T, C>(
    conn: &T,
    codec: &C,
    msg: impl Into<String>,
) -> Result<(), RolecallError>
where
    T: Connection<Error = TransportError>,
    C: Codec,
{
    send_message(conn, codec, &ServerMessage::error(msg)).await
}
