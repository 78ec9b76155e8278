//! HTTP route integration tests.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;

    let response = server.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let server = TestServer::start().await;
    let (_, token) = server.add_user("Alice");
    let _client = server.connect(&token).await;

    let response = server.request("GET", "/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["database"], "disabled");
    assert!(data.get("database_pool").is_none());
    assert_eq!(data["persistence_backend"], "memory");
    assert_eq!(data["ws_connections"], 1);
    assert_eq!(data["registered_users"], 1);
    assert_eq!(data["metrics"]["connections_total"], 1);
}

#[tokio::test]
async fn test_presence_snapshot_route() {
    let server = TestServer::start().await;
    let (alice, token) = server.add_user("Alice");
    let mut client = server.connect(&token).await;

    client
        .send(json!({ "event": "CHAT_JOINED", "data": { "userId": alice, "members": [alice] } }))
        .await;
    client.recv_event("ONLINE_USERS").await;

    let response = server.request("GET", "/api/presence/online").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 1);
    assert_eq!(response.body["data"]["users"][0]["userId"], json!(alice));
}

#[tokio::test]
async fn test_ws_route_without_upgrade_is_rejected() {
    let server = TestServer::start().await;

    let response = server.request("GET", "/ws").await;

    assert!(
        response.status.is_client_error(),
        "expected a 4xx, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = TestServer::start().await;

    let response = server.request("GET", "/api/nope").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
