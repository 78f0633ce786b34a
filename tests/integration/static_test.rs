//! Integration tests for the static fixture server.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;

use mirror_api::router::build_static_router;

use helpers::{TestRelay, fixtures_root, test_config};

#[tokio::test]
async fn test_serves_fixture_file() {
    let relay = TestRelay::start().await;

    let body: serde_json::Value = reqwest::get(relay.http_url("/sample.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["scene"], "fixture");
    assert_eq!(body["items"], serde_json::json!([1, 2, 3]));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_directory_serves_index() {
    let relay = TestRelay::start().await;

    let response = reqwest::get(relay.http_url("/")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().contains("mirror relay fixture index"));

    relay.shutdown().await;
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let config = test_config();
    assert_eq!(config.static_files.root, fixtures_root());
    let router = build_static_router(&config.static_files);

    let response = router
        .oneshot(Request::get("/nope.txt").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabled_static_server_is_not_bound() {
    let mut config = test_config();
    config.static_files.enabled = false;
    let relay = TestRelay::with_config(config).await;

    assert!(relay.server.http_addr.is_none());

    relay.shutdown().await;
}
