//! HTTP surface: a health probe and the websocket upgrade. Everything
//! else happens over the websocket protocol.

pub mod websocket;

use axum::{Router, extract::State, response::Json, routing::get};
use card_room::GameServer;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub server: Arc<GameServer>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    games: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        games: state.server.game_count().await,
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
