//! End-to-end tests: real server, real WebSocket clients, JSON frames.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use muster::MusterServer;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const ADMIN_KEY: &str = "test-admin";

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on random ports and returns the WebSocket address.
async fn start_server() -> String {
    let server = MusterServer::builder()
        .bind("127.0.0.1:0")
        .http_bind("127.0.0.1:0")
        .admin_key(ADMIN_KEY)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

/// Connects and consumes the `connected` greeting, returning the stream
/// and the assigned player id.
async fn connect(addr: &str) -> (ClientWs, u64) {
    let (mut ws, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("should connect");
    let connected =
        recv_matching(&mut ws, |v| v["type"] == "connected").await;
    assert!(connected["serverTime"].as_u64().is_some());
    let id = connected["playerId"].as_u64().expect("player id");
    (ws, id)
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("client send");
}

async fn register(ws: &mut ClientWs, name: &str) {
    send(ws, json!({ "type": "register", "hero": { "name": name } }))
        .await;
}

/// Reads frames until one matches the predicate (skipping unrelated
/// broadcasts), failing the test after two seconds.
async fn recv_matching(
    ws: &mut ClientWs,
    pred: impl Fn(&Value) -> bool,
) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let msg = ws
                .next()
                .await
                .expect("stream should stay open")
                .expect("frame should decode");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(text.as_str())
                    .expect("server sends valid JSON");
                if pred(&value) {
                    return value;
                }
            }
        }
    })
    .await
    .expect("expected envelope did not arrive in time")
}

/// Asserts no frame arrives within a short window.
async fn expect_silence(ws: &mut ClientWs) {
    let result =
        tokio::time::timeout(Duration::from_millis(300), ws.next())
            .await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

/// Waits for the close frame and returns its reason.
async fn recv_close_reason(ws: &mut ClientWs) -> String {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(Some(frame)))) => {
                    return frame.reason.to_string();
                }
                Some(Ok(_)) => continue,
                other => panic!("expected close frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("close frame did not arrive in time")
}

// =========================================================================
// Connection and roster
// =========================================================================

#[tokio::test]
async fn test_connect_assigns_distinct_player_ids() {
    let addr = start_server().await;
    let (_ws_a, id_a) = connect(&addr).await;
    let (_ws_b, id_b) = connect(&addr).await;
    assert_ne!(id_a, id_b);
}

#[tokio::test]
async fn test_register_broadcasts_full_player_list() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    let (mut ws_b, _) = connect(&addr).await;

    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;

    let roster = recv_matching(&mut ws_a, |v| {
        v["type"] == "player_list"
            && v["players"].as_array().is_some_and(|p| p.len() == 2)
    })
    .await;
    let names: Vec<&str> = roster["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["hero"]["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Aria") && names.contains(&"Borin"));
}

// =========================================================================
// Rooms
// =========================================================================

#[tokio::test]
async fn test_create_and_join_flow() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    let (mut ws_b, id_b) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;

    send(&mut ws_a, json!({ "type": "create_game", "gameName": "cows" }))
        .await;
    let joined =
        recv_matching(&mut ws_a, |v| v["type"] == "joined_game").await;
    assert_eq!(joined["isHost"], true);
    let game_id = joined["gameId"].as_u64().expect("game id");

    // The creation is announced globally.
    let created =
        recv_matching(&mut ws_b, |v| v["type"] == "game_created").await;
    assert_eq!(created["game"]["name"], "cows");
    assert_eq!(created["game"]["players"], 1);

    send(&mut ws_b, json!({ "type": "join_game", "gameId": game_id }))
        .await;
    let joined_b =
        recv_matching(&mut ws_b, |v| v["type"] == "joined_game").await;
    assert_eq!(joined_b["isHost"], false);

    // The host learns about the newcomer.
    let player_joined =
        recv_matching(&mut ws_a, |v| v["type"] == "player_joined").await;
    assert_eq!(player_joined["player"]["id"].as_u64(), Some(id_b));
    assert_eq!(player_joined["player"]["hero"]["name"], "Borin");
}

#[tokio::test]
async fn test_join_with_wrong_password_gets_error_reply() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    let (mut ws_b, _) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;

    send(
        &mut ws_a,
        json!({
            "type": "create_game",
            "gameName": "secret",
            "password": "moo"
        }),
    )
    .await;
    let created =
        recv_matching(&mut ws_b, |v| v["type"] == "game_created").await;
    let game_id = created["game"]["id"].as_u64().unwrap();

    send(
        &mut ws_b,
        json!({
            "type": "join_game",
            "gameId": game_id,
            "password": "oink"
        }),
    )
    .await;

    let error = recv_matching(&mut ws_b, |v| v["type"] == "error").await;
    assert_eq!(error["message"], "Wrong password");
}

#[tokio::test]
async fn test_get_games_returns_room_listing() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    send(
        &mut ws_a,
        json!({
            "type": "create_game",
            "gameName": "cows",
            "password": "moo"
        }),
    )
    .await;
    recv_matching(&mut ws_a, |v| v["type"] == "joined_game").await;

    send(&mut ws_a, json!({ "type": "get_games" })).await;

    let listing =
        recv_matching(&mut ws_a, |v| v["type"] == "games_list").await;
    let games = listing["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["name"], "cows");
    assert_eq!(games[0]["hasPassword"], true);
    assert_eq!(games[0]["maxPlayers"], 8);
}

#[tokio::test]
async fn test_host_leave_promotes_survivor() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    let (mut ws_b, id_b) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;
    send(&mut ws_a, json!({ "type": "create_game", "gameName": "g1" }))
        .await;
    let joined =
        recv_matching(&mut ws_a, |v| v["type"] == "joined_game").await;
    let game_id = joined["gameId"].as_u64().unwrap();
    send(&mut ws_b, json!({ "type": "join_game", "gameId": game_id }))
        .await;
    recv_matching(&mut ws_b, |v| v["type"] == "joined_game").await;

    send(&mut ws_a, json!({ "type": "leave_game" })).await;

    let new_host =
        recv_matching(&mut ws_b, |v| v["type"] == "new_host").await;
    assert_eq!(new_host["hostId"].as_u64(), Some(id_b));
}

// =========================================================================
// Chat
// =========================================================================

#[tokio::test]
async fn test_room_chat_stays_in_the_room() {
    let addr = start_server().await;
    let (mut ws_a, _) = connect(&addr).await;
    let (mut ws_b, _) = connect(&addr).await;
    let (mut ws_c, _) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;
    register(&mut ws_c, "Cale").await;

    send(&mut ws_a, json!({ "type": "create_game", "gameName": "g1" }))
        .await;
    let joined =
        recv_matching(&mut ws_a, |v| v["type"] == "joined_game").await;
    let game_id = joined["gameId"].as_u64().unwrap();
    send(&mut ws_b, json!({ "type": "join_game", "gameId": game_id }))
        .await;
    recv_matching(&mut ws_b, |v| v["type"] == "joined_game").await;
    // Let C drain the global announcements first.
    recv_matching(&mut ws_c, |v| v["type"] == "game_created").await;

    send(&mut ws_a, json!({ "type": "chat", "message": "moo" })).await;

    let chat = recv_matching(&mut ws_b, |v| v["type"] == "chat").await;
    assert_eq!(chat["from"], "Aria");
    assert_eq!(chat["message"], "moo");
    expect_silence(&mut ws_c).await;
}

// =========================================================================
// Protocol errors
// =========================================================================

#[tokio::test]
async fn test_malformed_frame_is_dropped_and_connection_survives() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;
    register(&mut ws, "Aria").await;

    ws.send(Message::text("this is not json"))
        .await
        .expect("send garbage");
    ws.send(Message::text(r#"{"type":"unknown_envelope"}"#))
        .await
        .expect("send unknown");

    // The connection is still serviced afterwards.
    send(&mut ws, json!({ "type": "get_games" })).await;
    let listing =
        recv_matching(&mut ws, |v| v["type"] == "games_list").await;
    assert!(listing["games"].as_array().unwrap().is_empty());
}

// =========================================================================
// Moderation
// =========================================================================

#[tokio::test]
async fn test_admin_stats_requires_exact_secret() {
    let addr = start_server().await;
    let (mut ws, _) = connect(&addr).await;
    register(&mut ws, "Aria").await;
    // Drain the roster broadcast our own registration produced.
    recv_matching(&mut ws, |v| v["type"] == "player_list").await;

    send(
        &mut ws,
        json!({ "type": "admin_stats", "adminKey": "wrong" }),
    )
    .await;
    expect_silence(&mut ws).await;

    send(
        &mut ws,
        json!({ "type": "admin_stats", "adminKey": ADMIN_KEY }),
    )
    .await;
    let stats =
        recv_matching(&mut ws, |v| v["type"] == "admin_stats").await;
    assert_eq!(stats["stats"]["players"], 1);
    assert_eq!(stats["stats"]["bannedIps"], 0);
}

#[tokio::test]
async fn test_admin_kick_closes_target_and_migrates_host() {
    let addr = start_server().await;
    let (mut ws_a, id_a) = connect(&addr).await;
    let (mut ws_b, id_b) = connect(&addr).await;
    let (mut ws_admin, _) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;
    register(&mut ws_b, "Borin").await;

    send(&mut ws_a, json!({ "type": "create_game", "gameName": "g1" }))
        .await;
    let joined =
        recv_matching(&mut ws_a, |v| v["type"] == "joined_game").await;
    let game_id = joined["gameId"].as_u64().unwrap();
    send(&mut ws_b, json!({ "type": "join_game", "gameId": game_id }))
        .await;
    recv_matching(&mut ws_b, |v| v["type"] == "joined_game").await;

    send(
        &mut ws_admin,
        json!({
            "type": "admin_kick",
            "adminKey": ADMIN_KEY,
            "targetId": id_a
        }),
    )
    .await;

    assert_eq!(recv_close_reason(&mut ws_a).await, "Kicked by admin");
    let new_host =
        recv_matching(&mut ws_b, |v| v["type"] == "new_host").await;
    assert_eq!(new_host["hostId"].as_u64(), Some(id_b));
    // The roster no longer carries the kicked player.
    let roster = recv_matching(&mut ws_b, |v| {
        v["type"] == "player_list"
            && v["players"].as_array().is_some_and(|p| {
                p.iter().all(|e| e["id"].as_u64() != Some(id_a))
            })
    })
    .await;
    assert!(roster["players"].as_array().unwrap().len() <= 1);
}

#[tokio::test]
async fn test_admin_ban_rejects_future_connections_from_address() {
    let addr = start_server().await;
    let (mut ws_target, target_id) = connect(&addr).await;
    let (mut ws_admin, _) = connect(&addr).await;
    register(&mut ws_target, "Aria").await;

    send(
        &mut ws_admin,
        json!({
            "type": "admin_ban",
            "adminKey": ADMIN_KEY,
            "targetId": target_id
        }),
    )
    .await;
    assert_eq!(
        recv_close_reason(&mut ws_target).await,
        "Banned by admin"
    );

    // A fresh connection from the same address is rejected before any
    // player state exists — even presenting a different hero.
    let (mut ws_retry, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("tcp/ws handshake still completes");
    assert_eq!(recv_close_reason(&mut ws_retry).await, "Banned");
}

#[tokio::test]
async fn test_admin_kick_with_wrong_secret_changes_nothing() {
    let addr = start_server().await;
    let (mut ws_a, id_a) = connect(&addr).await;
    let (mut ws_admin, _) = connect(&addr).await;
    register(&mut ws_a, "Aria").await;

    send(
        &mut ws_admin,
        json!({
            "type": "admin_kick",
            "adminKey": "wrong",
            "targetId": id_a
        }),
    )
    .await;
    expect_silence(&mut ws_admin).await;

    // The target is still connected and serviced.
    send(&mut ws_a, json!({ "type": "get_games" })).await;
    recv_matching(&mut ws_a, |v| v["type"] == "games_list").await;
}
