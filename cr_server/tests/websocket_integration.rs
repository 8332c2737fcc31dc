//! End-to-end test over a live websocket: authenticate, create a game,
//! join it from a second client, start a hand, and watch masked updates
//! arrive.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use card_room::GameServer;
use card_room::auth::JwtVerifier;
use card_room::store::InMemoryChipStore;
use cr_server::api::{AppState, create_router};

const SECRET: &str = "integration-test-secret-32-chars-ok";

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Serialize)]
struct Claims {
    sub: i64,
    username: String,
    role: String,
    exp: i64,
}

fn mint_token(sub: i64, username: &str) -> String {
    let claims = Claims {
        sub,
        username: username.to_string(),
        role: "player".to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

async fn spawn_server() -> SocketAddr {
    let verifier = Arc::new(JwtVerifier::new(SECRET));
    let chip_store = Arc::new(InMemoryChipStore::new(1000));
    let server = Arc::new(GameServer::new(verifier, chip_store));
    let app = create_router(AppState { server });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn ws_connect(addr: SocketAddr) -> WsClient {
    let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

async fn send(socket: &mut WsClient, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

/// Reads events until one with the wanted type arrives, failing on
/// anything unexpected taking too long.
async fn recv_until(socket: &mut WsClient, wanted: &str) -> Value {
    for _ in 0..50 {
        let message = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
            .await
            .expect("event before timeout")
            .expect("socket open")
            .expect("clean frame");
        if let Message::Text(text) = message {
            let event: Value = serde_json::from_str(&text).unwrap();
            if event["type"] == wanted {
                return event;
            }
        }
    }
    panic!("no {wanted} event received");
}

async fn authenticate(socket: &mut WsClient, sub: i64, username: &str) {
    let token = mint_token(sub, username);
    send(
        socket,
        serde_json::json!({"type": "authenticate", "token": token}),
    )
    .await;
    let event = recv_until(socket, "auth_success").await;
    assert_eq!(event["playerId"], sub);
    assert_eq!(event["username"], username);
}

#[tokio::test]
async fn test_full_session_over_websocket() {
    let addr = spawn_server().await;

    // Alice authenticates and opens a table.
    let mut alice = ws_connect(addr).await;
    authenticate(&mut alice, 1, "alice").await;
    send(
        &mut alice,
        serde_json::json!({"type": "create_game", "smallBlind": 10, "bigBlind": 20}),
    )
    .await;
    let created = recv_until(&mut alice, "game_created").await;
    let game_id = created["gameId"].as_str().unwrap().to_string();
    assert_eq!(created["game"]["playerCount"], 1);

    // Bob joins from a second connection.
    let mut bob = ws_connect(addr).await;
    authenticate(&mut bob, 2, "bob").await;
    send(
        &mut bob,
        serde_json::json!({"type": "join_game", "gameId": game_id}),
    )
    .await;
    let state = recv_until(&mut bob, "game_state").await;
    assert_eq!(state["state"]["gameState"], "waiting");
    assert_eq!(state["state"]["players"].as_array().unwrap().len(), 2);

    let joined = recv_until(&mut alice, "player_joined").await;
    assert_eq!(joined["playerId"], 2);

    // Alice starts the hand; both sides receive masked updates.
    send(
        &mut alice,
        serde_json::json!({"type": "game_action", "action": {"type": "start_game"}}),
    )
    .await;

    let update = recv_until(&mut alice, "game_update").await;
    let state = &update["state"];
    assert_eq!(state["gameState"], "preflop");
    assert_eq!(state["pot"], 30);
    assert_eq!(state["currentBet"], 20);
    let players = state["players"].as_array().unwrap();
    let own = players.iter().find(|p| p["id"] == 1).unwrap();
    assert_ne!(own["hand"][0], "??");
    let other = players.iter().find(|p| p["id"] == 2).unwrap();
    assert_eq!(other["hand"][0], "??");

    let update = recv_until(&mut bob, "game_update").await;
    let players = update["state"]["players"].as_array().unwrap();
    let own = players.iter().find(|p| p["id"] == 2).unwrap();
    assert_ne!(own["hand"][0], "??");

    // Heads-up: seat 0 (alice) opens; she calls, bob checks, the flop
    // comes and both clients observe it.
    send(
        &mut alice,
        serde_json::json!({"type": "game_action", "action": {"type": "call"}}),
    )
    .await;
    send(
        &mut bob,
        serde_json::json!({"type": "game_action", "action": {"type": "check"}}),
    )
    .await;

    let mut saw_flop = false;
    for _ in 0..5 {
        let update = recv_until(&mut bob, "game_update").await;
        if update["state"]["gameState"] == "flop" {
            assert_eq!(
                update["state"]["communityCards"].as_array().unwrap().len(),
                3
            );
            assert_eq!(update["state"]["pot"], 40);
            saw_flop = true;
            break;
        }
    }
    assert!(saw_flop, "flop update should arrive");
}

#[tokio::test]
async fn test_invalid_token_yields_auth_error() {
    let addr = spawn_server().await;
    let mut socket = ws_connect(addr).await;
    send(
        &mut socket,
        serde_json::json!({"type": "authenticate", "token": "garbage"}),
    )
    .await;
    let event = recv_until(&mut socket, "auth_error").await;
    assert_eq!(event["error"], "invalid token");
}

#[tokio::test]
async fn test_unauthenticated_action_yields_error() {
    let addr = spawn_server().await;
    let mut socket = ws_connect(addr).await;
    send(&mut socket, serde_json::json!({"type": "join_lobby"})).await;
    let event = recv_until(&mut socket, "error").await;
    assert_eq!(event["error"], "not authenticated");
}

#[tokio::test]
async fn test_malformed_frame_yields_error() {
    let addr = spawn_server().await;
    let mut socket = ws_connect(addr).await;
    socket
        .send(Message::Text("this is not json".to_string().into()))
        .await
        .unwrap();
    let event = recv_until(&mut socket, "error").await;
    assert_eq!(event["error"], "invalid message format");
}

#[tokio::test]
async fn test_lobby_update_over_websocket() {
    let addr = spawn_server().await;

    let mut alice = ws_connect(addr).await;
    authenticate(&mut alice, 1, "alice").await;
    let mut bob = ws_connect(addr).await;
    authenticate(&mut bob, 2, "bob").await;

    send(&mut bob, serde_json::json!({"type": "join_lobby"})).await;
    let update = recv_until(&mut bob, "lobby_update").await;
    assert_eq!(update["games"].as_array().unwrap().len(), 0);

    send(
        &mut alice,
        serde_json::json!({"type": "create_game", "smallBlind": 25, "bigBlind": 50}),
    )
    .await;
    let available = recv_until(&mut bob, "available_games").await;
    let games = available["games"].as_array().unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0]["smallBlind"], 25);
    assert_eq!(games[0]["gameState"], "waiting");
}
