//! Integration tests for the WebSocket relay.

mod helpers;

use serde_json::json;

use mirror_core::types::Mode;

use helpers::{TestRelay, assert_silent, expect_closed, recv_json, send_json, send_text, wait_until};

#[tokio::test]
async fn test_desktop_ping_reaches_web() {
    let relay = TestRelay::start().await;

    let mut desktop = relay.identify(Mode::Desktop, "abc").await;
    let mut web = relay.identify(Mode::Web, "abc").await;

    send_json(&mut desktop, &json!({"type": "ping", "seq": 1})).await;
    assert_eq!(recv_json(&mut web).await, json!({"type": "ping", "seq": 1}));

    send_json(&mut web, &json!({"type": "pong", "seq": 1})).await;
    assert_eq!(recv_json(&mut desktop).await, json!({"type": "pong", "seq": 1}));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_message_before_peer_connects_is_lost() {
    let relay = TestRelay::start().await;

    let mut desktop = relay.identify(Mode::Desktop, "abc").await;
    send_json(&mut desktop, &json!({"type": "ping", "seq": 1})).await;
    wait_until(|| relay.engine().metrics.snapshot().messages_peer_absent == 1).await;

    let mut web = relay.identify(Mode::Web, "abc").await;
    assert_silent(&mut web).await;

    send_json(&mut desktop, &json!({"type": "ping", "seq": 2})).await;
    assert_eq!(recv_json(&mut web).await, json!({"type": "ping", "seq": 2}));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_messages_keep_send_order() {
    let relay = TestRelay::start().await;

    let mut desktop = relay.identify(Mode::Desktop, "order").await;
    let mut web = relay.identify(Mode::Web, "order").await;

    for seq in 0..20 {
        send_json(&mut desktop, &json!({"seq": seq})).await;
    }
    for seq in 0..20 {
        assert_eq!(recv_json(&mut web).await, json!({"seq": seq}));
    }

    relay.shutdown().await;
}

#[tokio::test]
async fn test_ids_are_independent() {
    let relay = TestRelay::start().await;

    let mut desktop_x = relay.identify(Mode::Desktop, "x").await;
    let mut web_x = relay.identify(Mode::Web, "x").await;
    let mut web_y = relay.identify(Mode::Web, "y").await;

    send_json(&mut desktop_x, &json!({"for": "x"})).await;

    assert_eq!(recv_json(&mut web_x).await, json!({"for": "x"}));
    assert_silent(&mut web_y).await;

    relay.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_replaces_stale_connection() {
    let relay = TestRelay::start().await;

    let mut stale = relay.identify(Mode::Desktop, "x").await;
    let mut fresh = relay.identify(Mode::Desktop, "x").await;
    let mut web = relay.identify(Mode::Web, "x").await;

    send_json(&mut web, &json!({"to": "desktop"})).await;

    assert_eq!(recv_json(&mut fresh).await, json!({"to": "desktop"}));
    assert_silent(&mut stale).await;

    // The stale session leaving must not unregister its successor.
    stale.close(None).await.ok();
    let fresh_id = relay.engine().registry.lookup(Mode::Desktop, "x").unwrap().id;
    wait_until(|| relay.engine().supervisor.active_count() == 2).await;
    assert_eq!(
        relay.engine().registry.lookup(Mode::Desktop, "x").map(|c| c.id),
        Some(fresh_id)
    );

    relay.shutdown().await;
}

#[tokio::test]
async fn test_invalid_identification_is_rejected() {
    let relay = TestRelay::start().await;

    for bad in [
        "not json",
        r#"["web","abc"]"#,
        r#"{"client_mode":"web"}"#,
        r#"{"client_mode":"tablet","client_id":"abc"}"#,
        r#"{"client_mode":"web","client_id":42}"#,
    ] {
        let mut ws = relay.connect().await;
        send_text(&mut ws, bad).await;
        expect_closed(&mut ws).await;
    }

    wait_until(|| relay.engine().metrics.snapshot().identification_failures == 5).await;
    assert!(relay.engine().registry.is_empty());

    relay.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_deregisters() {
    let relay = TestRelay::start().await;

    let mut web = relay.identify(Mode::Web, "gone").await;
    assert!(relay.engine().registry.contains(Mode::Web, "gone"));

    web.close(None).await.ok();
    wait_until(|| !relay.engine().registry.contains(Mode::Web, "gone")).await;
    wait_until(|| relay.engine().supervisor.active_count() == 0).await;
    assert!(relay.engine().orphaned_entries().is_empty());

    relay.shutdown().await;
}

#[tokio::test]
async fn test_malformed_relay_message_is_dropped() {
    let relay = TestRelay::start().await;

    let mut desktop = relay.identify(Mode::Desktop, "abc").await;
    let mut web = relay.identify(Mode::Web, "abc").await;

    send_text(&mut desktop, "{definitely not json").await;
    send_json(&mut desktop, &json!({"still": "relaying"})).await;

    assert_eq!(recv_json(&mut web).await, json!({"still": "relaying"}));
    assert_eq!(relay.engine().metrics.snapshot().messages_invalid, 1);
    assert!(relay.engine().registry.contains(Mode::Desktop, "abc"));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_non_object_messages_are_relayed() {
    let relay = TestRelay::start().await;

    let mut desktop = relay.identify(Mode::Desktop, "abc").await;
    let mut web = relay.identify(Mode::Web, "abc").await;

    send_json(&mut web, &json!([1, "two", null])).await;
    assert_eq!(recv_json(&mut desktop).await, json!([1, "two", null]));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_closes_everything() {
    let relay = TestRelay::start().await;

    let mut web = relay.identify(Mode::Web, "abc").await;
    let mut desktop = relay.identify(Mode::Desktop, "abc").await;
    let idle = relay.connect().await;

    let engine = relay.engine().clone();
    assert!(relay.shutdown().await);

    expect_closed(&mut web).await;
    expect_closed(&mut desktop).await;
    drop(idle);
    assert!(engine.registry.is_empty());
    assert_eq!(engine.supervisor.active_count(), 0);
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let relay = TestRelay::start().await;
    let _desktop = relay.identify(Mode::Desktop, "abc").await;

    let base = format!("http://{}", relay.server.relay_addr);
    let health: serde_json::Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["registered_desktop"], 1);
    assert_eq!(health["registered_web"], 0);

    let metrics: serde_json::Value = reqwest::get(format!("{base}/metrics"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(metrics["connections_total"], 1);
    assert_eq!(metrics["connections_active"], 1);

    relay.shutdown().await;
}
