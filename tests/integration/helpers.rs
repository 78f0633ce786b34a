//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use mirror_api::{RunningServer, start_server};
use mirror_core::config::AppConfig;
use mirror_core::types::Mode;
use mirror_realtime::RelayEngine;

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// How long "nothing arrives" is observed for.
pub const QUIET: Duration = Duration::from_millis(300);

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Directory with the static fixtures served in tests.
pub fn fixtures_root() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/static").to_string()
}

/// Config bound to loopback on ephemeral ports.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.relay_port = 0;
    config.server.http_port = 0;
    config.server.shutdown_grace_seconds = 2;
    config.static_files.root = fixtures_root();
    config
}

/// Test application context
pub struct TestRelay {
    pub server: RunningServer,
}

impl TestRelay {
    /// Start the relay and static servers with the test config.
    pub async fn start() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let server = start_server(config).await.expect("Failed to start servers");
        Self { server }
    }

    pub fn engine(&self) -> &RelayEngine {
        &self.server.state.engine
    }

    pub fn ws_url(&self) -> String {
        format!(
            "ws://{}{}",
            self.server.relay_addr, self.server.state.config.relay.ws_path
        )
    }

    pub fn http_url(&self, path: &str) -> String {
        let addr = self.server.http_addr.expect("static server disabled");
        format!("http://{addr}{path}")
    }

    /// Open a WebSocket without identifying.
    pub async fn connect(&self) -> WsClient {
        let (ws, _) = tokio::time::timeout(WAIT, connect_async(self.ws_url()))
            .await
            .expect("connect timed out")
            .expect("Failed to connect");
        ws
    }

    /// Connect, identify, and wait until the relay has registered this connection.
    pub async fn identify(&self, mode: Mode, id: &str) -> WsClient {
        let previous = self.engine().registry.lookup(mode, id).map(|c| c.id);

        let mut ws = self.connect().await;
        send_json(&mut ws, &json!({"client_mode": mode.as_str(), "client_id": id})).await;

        let registry = self.engine().registry.clone();
        let id = id.to_string();
        wait_until(move || {
            registry
                .lookup(mode, &id)
                .is_some_and(|conn| Some(conn.id) != previous)
        })
        .await;
        ws
    }

    pub async fn shutdown(self) -> bool {
        self.server.shutdown().await.expect("Shutdown failed")
    }
}

pub async fn send_json(ws: &mut WsClient, value: &Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send");
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::text(text)).await.expect("Failed to send");
}

/// Next JSON text message, failing after [`WAIT`].
pub async fn recv_json(ws: &mut WsClient) -> Value {
    tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).expect("relay sent invalid JSON");
                }
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                other => panic!("expected a text message, got {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for message")
}

/// Assert no data message arrives within [`QUIET`].
pub async fn assert_silent(ws: &mut WsClient) {
    if let Ok(Some(Ok(message))) = tokio::time::timeout(QUIET, ws.next()).await {
        assert!(
            !message.is_text() && !message.is_binary(),
            "unexpected message: {message:?}"
        );
    }
}

/// Wait until the connection is closed by the server.
pub async fn expect_closed(ws: &mut WsClient) {
    tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .expect("connection was not closed");
}

/// Poll `cond` until it holds, failing after [`WAIT`].
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
