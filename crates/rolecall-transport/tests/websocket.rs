//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener and a `tokio-tungstenite` client to check
//! that frames, the request target, and close handshakes flow correctly.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use rolecall_transport::{Connection, Handshake, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on an OS-assigned port and returns the transport with its address.
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    async fn connect_client(url: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });

        let mut client_ws =
            connect_client(&format!("ws://{addr}/ws/room-1")).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);
        assert_eq!(server_conn.target(), "/ws/room-1");

        // JSON-ish payloads go out as text frames.
        server_conn
            .send(br#"{"type":"destroyed"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text());
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"destroyed"}"#);

        client_ws
            .send(Message::text(r#"{"action":"start"}"#.to_string()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"action":"start"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_target_keeps_query() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });

        let _client =
            connect_client(&format!("ws://{addr}/ws/r?nickname=ann")).await;
        let server_conn = server_handle.await.unwrap();
        assert_eq!(server_conn.target(), "/ws/r?nickname=ann");
    }

    #[tokio::test]
    async fn test_websocket_send_not_blocked_by_pending_recv() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });

        let mut client_ws = connect_client(&format!("ws://{addr}/ws/r")).await;
        let server_conn =
            std::sync::Arc::new(server_handle.await.unwrap());

        // Park a reader on the connection, then send from elsewhere.
        let reader = std::sync::Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(2), server_conn.send(b"hi"))
            .await
            .expect("send must not wait for the reader")
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hi");

        client_ws.send(Message::Close(None)).await.unwrap();
        let result = pending.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;
        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });

        let mut client_ws = connect_client(&format!("ws://{addr}/ws/r")).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_accept_returns_before_handshake() {
        let (mut transport, addr) = bind().await;

        // A peer that connects but never sends the upgrade request.
        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let idle = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must not wait for the handshake")
            .expect("should accept");
        assert!(idle.peer_addr().ip().is_loopback());

        let server_handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            pending.complete().await.expect("handshake should succeed")
        });
        let _client = connect_client(&format!("ws://{addr}/ws/r")).await;
        let server_conn = tokio::time::timeout(Duration::from_secs(2), server_handle)
            .await
            .expect("second peer should upgrade while the first idles")
            .unwrap();
        assert_eq!(server_conn.target(), "/ws/r");
    }
}
