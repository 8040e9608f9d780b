//! `RolecallServer` builder and server loop.
//!
//! This is the entry point for running a Rolecall server. It ties
//! together all the layers: transport → protocol → room session.

use std::sync::Arc;
use std::time::Duration;

use rolecall_protocol::{Codec, JsonCodec, RoomId};
use rolecall_room::{RoomConfig, RoomRegistry};
use rolecall_transport::{
    Connection, Handshake, Transport, TransportError, WebSocketTransport,
};
use tokio::sync::Mutex;

use crate::RolecallError;
use crate::handler::run_session;

/// How long a freshly accepted peer gets to finish the WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each session task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The room
/// registry sits behind one `Mutex`; sessions hold it only for a single
/// room round-trip, never across network I/O.
pub struct ServerState<C: Codec = JsonCodec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) room_config: RoomConfig,
    pub(crate) codec: C,
}

impl<C: Codec> ServerState<C> {
    /// Creates state with an empty registry.
    pub fn new(room_config: RoomConfig, codec: C) -> Self {
        Self {
            rooms: Mutex::new(RoomRegistry::new(room_config.clone())),
            room_config,
            codec,
        }
    }

    /// Runs one room session on `conn` until it ends.
    ///
    /// The server's accept loop calls this for every WebSocket; tests can
    /// hand it any other [`Connection`].
    pub async fn serve<T>(self: &Arc<Self>, conn: T) -> Result<(), RolecallError>
    where
        T: Connection<Error = TransportError>,
    {
        run_session(conn, Arc::clone(self)).await
    }

    /// Returns the number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.room_count()
    }

    /// Returns `true` if a room with this id is live.
    pub async fn has_room(&self, room_id: &str) -> bool {
        self.rooms.lock().await.contains(&RoomId::from(room_id))
    }
}

impl Default for ServerState<JsonCodec> {
    fn default() -> Self {
        Self::new(RoomConfig::default(), JsonCodec)
    }
}

/// Builder for configuring and starting a Rolecall server.
///
/// # Example
///
/// ```rust,no_run
/// use rolecall::prelude::*;
///
/// # async fn run() -> Result<(), RolecallError> {
/// let server = RolecallServer::builder()
///     .bind("0.0.0.0:8000")
///     .room_config(RoomConfig::basic())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RolecallServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl RolecallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration used for every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<RolecallServer, RolecallError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState::new(self.room_config, JsonCodec));

        Ok(RolecallServer { transport, state })
    }
}

impl Default for RolecallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Rolecall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RolecallServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl RolecallServer {
    /// Creates a new builder.
    pub fn builder() -> RolecallServerBuilder {
        RolecallServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the shared state, e.g. to inspect live rooms.
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a task for each accepted connection, which completes the
    /// WebSocket upgrade and then runs the session. Runs until the process
    /// is terminated.
    pub async fn run(mut self) -> Result<(), RolecallError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "rolecall server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match tokio::time::timeout(
                            HANDSHAKE_TIMEOUT,
                            pending.complete(),
                        )
                        .await
                        {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%peer, "handshake timed out");
                                return;
                            }
                        };
                        let conn_id = conn.id();
                        if let Err(e) = state.serve(conn).await {
                            tracing::debug!(
                                %conn_id,
                                error = %e,
                                "session ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
