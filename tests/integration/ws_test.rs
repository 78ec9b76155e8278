//! WebSocket integration tests: authentication, fanout, presence.

use serde_json::json;
use tokio_tungstenite::tungstenite::Error as WsError;

use chathub_core::types::id::{ChatId, UserId};

use crate::helpers::{TestServer, eventually};

fn assert_unauthorized(result: Result<crate::helpers::WsClient, WsError>) {
    match result {
        Err(WsError::Http(response)) => assert_eq!(response.status().as_u16(), 401),
        Err(other) => panic!("expected HTTP 401, got {other}"),
        Ok(_) => panic!("expected the upgrade to be refused"),
    }
}

#[tokio::test]
async fn test_upgrade_without_cookie_is_refused() {
    let server = TestServer::start().await;

    assert_unauthorized(server.try_connect(None).await);
    assert_eq!(server.state.hub.registry.connection_count(), 0);
}

#[tokio::test]
async fn test_upgrade_with_bad_or_unknown_token_is_refused() {
    let server = TestServer::start().await;

    assert_unauthorized(server.try_connect(Some("not-a-jwt")).await);

    let (ghost, token) = server.add_user("Ghost");
    server.directory.remove(ghost);
    assert_unauthorized(server.try_connect(Some(&token)).await);

    assert_eq!(server.state.hub.registry.connection_count(), 0);
    assert_eq!(server.state.hub.metrics_snapshot().connections_rejected, 2);
}

#[tokio::test]
async fn test_new_message_reaches_all_members_and_is_persisted() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut a = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;
    let chat = ChatId::new();

    a.send(json!({
        "event": "NEW_MESSAGE",
        "data": { "chatId": chat, "members": [alice, bob], "message": "hello bob" }
    }))
    .await;

    for client in [&mut a, &mut b] {
        let frame = client.recv_event("NEW_MESSAGE").await;
        assert_eq!(frame["data"]["chatId"], json!(chat));
        assert_eq!(frame["data"]["message"]["content"], "hello bob");
        assert_eq!(frame["data"]["message"]["sender"]["_id"], json!(alice));
        assert_eq!(frame["data"]["message"]["sender"]["name"], "Alice");
        assert_eq!(frame["data"]["message"]["chat"], json!(chat));

        let alert = client.recv_event("NEW_MESSAGE_ALERT").await;
        assert_eq!(alert["data"], json!({ "chatId": chat }));
    }

    server.wait_for_persisted(1).await;
    let records = server.store.records().await;
    assert_eq!(records[0].sender_id, alice);
    assert_eq!(records[0].chat_id, chat);
    assert_eq!(records[0].content, "hello bob");
}

#[tokio::test]
async fn test_typing_is_delivered_to_others_only() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut a = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;
    let chat = ChatId::new();

    a.send(json!({
        "event": "START_TYPING",
        "data": { "chatId": chat, "members": [alice, bob] }
    }))
    .await;

    let frame = b.recv_event("START_TYPING").await;
    assert_eq!(frame["data"], json!({ "chatId": chat }));
    a.expect_silence().await;
}

#[tokio::test]
async fn test_chat_joined_pushes_online_users() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut a = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;

    a.send(json!({
        "event": "CHAT_JOINED",
        "data": { "userId": alice, "members": [alice, bob] }
    }))
    .await;

    for client in [&mut a, &mut b] {
        let frame = client.recv_event("ONLINE_USERS").await;
        assert_eq!(frame["data"], json!([alice]));
    }
    assert_eq!(server.state.hub.online_users(), vec![alice]);
}

#[tokio::test]
async fn test_disconnect_broadcasts_presence_to_remaining_connections() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut a = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;

    b.send(json!({
        "event": "CHAT_JOINED",
        "data": { "userId": bob, "members": [alice, bob] }
    }))
    .await;
    a.send(json!({
        "event": "CHAT_JOINED",
        "data": { "userId": alice, "members": [alice, bob] }
    }))
    .await;
    a.recv_event("ONLINE_USERS").await;
    a.recv_event("ONLINE_USERS").await;
    b.recv_event("ONLINE_USERS").await;
    b.recv_event("ONLINE_USERS").await;

    a.close().await;
    server.wait_for_connections(1).await;

    let frame = b.recv_event("ONLINE_USERS").await;
    assert_eq!(frame["data"], json!([bob]));
    assert!(!server.state.hub.registry.is_registered(alice));
    assert_eq!(server.state.hub.online_users(), vec![bob]);
}

#[tokio::test]
async fn test_malformed_event_gets_error_and_connection_survives() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let mut a = server.connect(&alice_token).await;

    a.send(json!({ "event": "NEW_MESSAGE", "data": { "members": [alice] } }))
        .await;
    let error = a.recv_event("ERROR").await;
    assert_eq!(error["data"]["code"], "MALFORMED_EVENT");

    a.send(json!({ "event": "CHAT_JOINED", "data": { "userId": alice, "members": [alice] } }))
        .await;
    let frame = a.recv_event("ONLINE_USERS").await;
    assert_eq!(frame["data"], json!([alice]));
    assert!(server.store.is_empty().await);
}

#[tokio::test]
async fn test_dispatch_to_unconnected_members_is_silent() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let mut a = server.connect(&alice_token).await;

    a.send(json!({
        "event": "ALERT",
        "data": { "chatId": ChatId::new(), "members": [alice, UserId::new()] }
    }))
    .await;

    a.expect_silence().await;
    assert_eq!(server.state.hub.registry.connection_count(), 1);
}

#[tokio::test]
async fn test_reconnect_supersedes_previous_connection() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut first = server.connect(&alice_token).await;
    let mut second = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;

    b.send(json!({
        "event": "REFETCH_CHATS",
        "data": { "chatId": ChatId::new(), "members": [alice, bob] }
    }))
    .await;

    second.recv_event("REFETCH_CHATS").await;
    first.expect_silence().await;
    assert_eq!(server.state.hub.registry.resolve(&[alice]).len(), 1);
}

#[tokio::test]
async fn test_shutdown_flushes_queued_frames_then_closes() {
    let server = TestServer::start().await;
    let (alice, alice_token) = server.add_user("Alice");
    let (bob, bob_token) = server.add_user("Bob");
    let mut a = server.connect(&alice_token).await;
    let mut b = server.connect(&bob_token).await;
    let chat = ChatId::new();

    a.send(json!({ "event": "START_TYPING", "data": { "chatId": chat, "members": [alice, bob] } }))
        .await;
    a.send(json!({ "event": "NOT_AN_EVENT", "data": {} })).await;
    let hub = server.state.hub.clone();
    eventually(|| hub.metrics_snapshot().events_rejected == 1).await;

    hub.shutdown().await.expect("shutdown");

    let events = |frames: Vec<serde_json::Value>| -> Vec<serde_json::Value> {
        frames
            .into_iter()
            .filter(|f| f["event"] != "ONLINE_USERS")
            .collect()
    };
    let a_frames = events(a.recv_until_closed().await);
    assert_eq!(a_frames.len(), 1);
    assert_eq!(a_frames[0]["event"], "ERROR");
    assert_eq!(
        events(b.recv_until_closed().await),
        vec![json!({ "event": "START_TYPING", "data": { "chatId": chat } })]
    );
}
