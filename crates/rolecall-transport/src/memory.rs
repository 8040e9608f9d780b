//! In-process connection backed by tokio channels.
//!
//! [`MemoryConnection::pair`] returns the server side (a regular
//! [`Connection`]) and a [`MemoryPeer`] that plays the client. Dropping or
//! disconnecting the peer looks like a clean close to the server, and
//! closing the server side ends the peer's stream.

use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{Connection, ConnectionId, TransportError};

/// Server side of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    target: String,
    outbound: Mutex<Option<UnboundedSender<Vec<u8>>>>,
    inbound: Mutex<UnboundedReceiver<Vec<u8>>>,
}

/// Client side of an in-memory connection.
pub struct MemoryPeer {
    outbound: Option<UnboundedSender<Vec<u8>>>,
    inbound: UnboundedReceiver<Vec<u8>>,
}

impl MemoryConnection {
    /// Creates a connected pair for a client that asked for `target`.
    pub fn pair(target: impl Into<String>) -> (Self, MemoryPeer) {
        let (to_server, from_peer) = mpsc::unbounded_channel();
        let (to_peer, from_server) = mpsc::unbounded_channel();
        let conn = Self {
            id: ConnectionId::next(),
            target: target.into(),
            outbound: Mutex::new(Some(to_peer)),
            inbound: Mutex::new(from_peer),
        };
        let peer = MemoryPeer {
            outbound: Some(to_server),
            inbound: from_server,
        };
        (conn, peer)
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let outbound = self.outbound.lock().await;
        let sender = outbound.as_ref().ok_or_else(|| {
            TransportError::ConnectionClosed("closed locally".into())
        })?;
        sender.send(data.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed("peer went away".into())
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.outbound.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn target(&self) -> &str {
        &self.target
    }
}

impl MemoryPeer {
    /// Sends a message to the server side.
    pub fn send(&self, data: impl Into<Vec<u8>>) -> Result<(), TransportError> {
        let sender = self.outbound.as_ref().ok_or_else(|| {
            TransportError::ConnectionClosed("peer disconnected".into())
        })?;
        sender.send(data.into()).map_err(|_| {
            TransportError::ConnectionClosed("server went away".into())
        })
    }

    /// Receives the next message from the server side.
    ///
    /// Returns `None` once the server has closed the connection (or
    /// dropped it) and every queued message has been read.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.inbound.recv().await
    }

    /// Disconnects from the server side; its `recv` yields `Ok(None)`.
    pub fn disconnect(&mut self) {
        self.outbound.take();
    }
}
