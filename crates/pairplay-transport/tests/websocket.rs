//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it with
//! both a raw tungstenite client and the transport's own client side.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use pairplay_transport::{
        ClientConnection, Connection, Transport, TransportError, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // Client → server, text frame.
        client_ws
            .send(Message::Text(r#"{"type":"leave"}"#.into()))
            .await
            .expect("client send");
        let received = server_conn.recv().await.expect("recv").expect("data");
        assert_eq!(received, br#"{"type":"leave"}"#);

        // Server → client: UTF-8 payloads go out as text frames.
        server_conn.send(b"{\"type\":\"waiting\"}").await.expect("send");
        let msg = client_ws.next().await.expect("frame").expect("ok");
        assert_eq!(msg, Message::Text("{\"type\":\"waiting\"}".into()));

        // Non-UTF-8 payloads go out as binary frames.
        server_conn.send(&[0xff, 0x00]).await.expect("send");
        let msg = client_ws.next().await.expect("frame").expect("ok");
        assert_eq!(msg.into_data().to_vec(), vec![0xff, 0x00]);
    }

    #[tokio::test]
    async fn test_websocket_client_close_yields_none() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");

        client_ws.close(None).await.expect("close");

        let received = server_conn.recv().await.expect("clean close");
        assert!(received.is_none());
    }

    #[tokio::test]
    async fn test_websocket_connect_round_trip_between_both_ends() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let client = ClientConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("connect");
        let server = server_handle.await.expect("task should complete");
        assert_ne!(client.id(), server.id());

        client.send(b"hello").await.expect("send");
        assert_eq!(server.recv().await.unwrap().unwrap(), b"hello");

        server.send(b"world").await.expect("send");
        assert_eq!(client.recv().await.unwrap().unwrap(), b"world");
    }

    #[tokio::test]
    async fn test_websocket_connect_to_closed_port_fails() {
        let (transport, addr) = bind_any().await;
        drop(transport);

        let result = ClientConnection::connect(&format!("ws://{addr}")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_websocket_control_frames_reset_idle_time() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(server_conn.idle_for() >= Duration::from_millis(150));

        // A bare ping never surfaces from recv, but it still counts.
        client_ws
            .send(Message::Ping(Vec::new().into()))
            .await
            .expect("client ping");
        let waited =
            tokio::time::timeout(Duration::from_millis(50), server_conn.recv()).await;
        assert!(waited.is_err(), "recv should not return a control frame");
        assert!(server_conn.idle_for() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_websocket_send_after_close_is_connection_closed() {
        let (mut transport, addr) = bind_any().await;
        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let client = ClientConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("connect");
        let _server = server_handle.await.expect("task should complete");

        client.close().await.expect("close");
        client.close().await.expect("second close is a no-op");

        assert!(matches!(
            client.send(b"late").await,
            Err(TransportError::ConnectionClosed(_))
        ));
        assert!(matches!(
            client.ping().await,
            Err(TransportError::ConnectionClosed(_))
        ));
    }
}
