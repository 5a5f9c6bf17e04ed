// Shared helpers for integration tests: a real server per test plus a thin WebSocket client.
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

// Upper bound for any single expected server message.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);
// How long "nothing arrives" is observed before it counts as silence.
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

// Start a fresh server on an ephemeral port and return its address.
pub async fn spawn_server() -> SocketAddr {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    // Capture the exact address that was assigned by the OS.
    let addr = listener.local_addr().expect("get local addr");
    // Serve on the test runtime; it goes away with the test.
    tokio::spawn(async move {
        arena_relay::run(listener).await.expect("server failed");
    });
    addr
}

pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (stream, _response) = connect_async(format!("ws://{addr}/ws"))
            .await
            .expect("websocket handshake");
        Self { stream }
    }

    // Connect and consume the `init` message; returns the client and its id.
    pub async fn join(addr: SocketAddr) -> (Self, String, Value) {
        let mut client = Self::connect(addr).await;
        let init = client.recv().await;
        assert_eq!(init["type"], "init", "first message must be init: {init}");
        let id = init["data"]["id"]
            .as_str()
            .expect("init id is a string")
            .to_string();
        (client, id, init)
    }

    pub async fn send(&mut self, message: Value) {
        self.send_raw(&message.to_string()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .expect("send websocket message");
    }

    pub async fn send_binary(&mut self, payload: Vec<u8>) {
        self.stream
            .send(Message::binary(payload))
            .await
            .expect("send binary frame");
    }

    // Next JSON message from the server, skipping control frames.
    pub async fn recv(&mut self) -> Value {
        loop {
            let message = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for server message")
                .expect("websocket stream ended")
                .expect("websocket error");
            match message {
                Message::Text(text) => {
                    return serde_json::from_str(&text).expect("server sends JSON");
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    pub async fn expect_silence(&mut self) {
        if let Ok(Some(message)) = timeout(SILENCE_WINDOW, self.stream.next()).await {
            panic!("expected no message, got {message:?}");
        }
    }

    // Wait for the server to close the socket and check the close code.
    pub async fn expect_close(&mut self, code: u16) {
        loop {
            let message = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for close frame")
                .expect("websocket stream ended before close frame")
                .expect("websocket error");
            match message {
                Message::Close(Some(frame)) => {
                    assert_eq!(u16::from(frame.code), code, "close reason: {}", frame.reason.as_str());
                    return;
                }
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("expected close frame, got {other:?}"),
            }
        }
    }

    pub async fn close(mut self) {
        self.stream.close(None).await.expect("close websocket");
    }

    // Drop the TCP connection without a closing handshake.
    pub fn abort(self) {
        drop(self.stream);
    }
}
