//! Multi-table card room server: axum websocket transport around the
//! `card_room` engine.

pub mod api;
pub mod config;
