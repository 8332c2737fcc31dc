//! The game server: a registry of connections, tables, and lobby
//! subscribers, routing client messages to the right table actor.
//!
//! The registries are their own critical section, distinct from any
//! table's betting state. No lock is held across the token verifier or a
//! table send; outbound delivery goes through per-connection channels
//! drained by the transport, so a stalled socket never blocks a table.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, oneshot};
use uuid::Uuid;

use super::messages::{ClientMessage, GameAction, GameId, GameSummary, ServerEvent};
use crate::auth::{Identity, TokenVerifier};
use crate::game::entities::PlayerId;
use crate::game::holdem::GameOptions;
use crate::store::ChipStore;
use crate::table::{TableActor, TableHandle, messages::TableMessage};
use thiserror::Error;

/// Type alias for connection identifiers.
pub type ConnectionId = Uuid;

#[derive(Debug, Eq, Error, PartialEq)]
pub enum ServerError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("game not found")]
    GameNotFound,
    #[error("not in a game")]
    NotInGame,
    #[error("already in a game")]
    AlreadyInGame,
    #[error("game is closed")]
    GameClosed,
}

#[derive(Debug)]
struct Connection {
    outbound: mpsc::UnboundedSender<ServerEvent>,
    identity: Option<Identity>,
    game_id: Option<GameId>,
}

/// Connection/session registry and message router. Constructed once at
/// server start with its collaborators injected; holds no ambient state.
pub struct GameServer {
    verifier: Arc<dyn TokenVerifier>,
    chip_store: Arc<dyn ChipStore>,
    games: RwLock<HashMap<GameId, TableHandle>>,
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    /// Authenticated players not yet routed to a table.
    waiting: RwLock<HashMap<PlayerId, mpsc::UnboundedSender<ServerEvent>>>,
    /// Connections subscribed to `available_games` broadcasts.
    lobby: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl GameServer {
    #[must_use]
    pub fn new(verifier: Arc<dyn TokenVerifier>, chip_store: Arc<dyn ChipStore>) -> Self {
        Self {
            verifier,
            chip_store,
            games: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            waiting: RwLock::new(HashMap::new()),
            lobby: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new connection and returns the channel its events are
    /// delivered on. The transport drains the receiver into the socket.
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (outbound, events) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        self.connections.write().await.insert(
            conn_id,
            Connection {
                outbound,
                identity: None,
                game_id: None,
            },
        );
        debug!("connection {conn_id} opened");
        (conn_id, events)
    }

    /// Removes a connection. The player stays seated at their table (no
    /// forced fold); they just stop receiving updates until a new
    /// connection re-authenticates and re-joins.
    pub async fn disconnect(&self, conn_id: ConnectionId) {
        let Some(conn) = self.connections.write().await.remove(&conn_id) else {
            return;
        };
        self.lobby.write().await.remove(&conn_id);
        if let Some(identity) = conn.identity {
            self.waiting.write().await.remove(&identity.user_id);
            if let Some(game_id) = conn.game_id {
                let handle = self.table_handle(game_id).await;
                if let Some(handle) = handle {
                    let _ = handle
                        .send(TableMessage::Unsubscribe {
                            player_id: identity.user_id,
                        })
                        .await;
                }
            }
        }
        debug!("connection {conn_id} closed");
    }

    /// Routes one client message. Validation failures are answered with an
    /// `error` event on the offending connection only.
    pub async fn handle_message(&self, conn_id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::Authenticate { token } => self.authenticate(conn_id, &token).await,
            ClientMessage::JoinLobby => self.join_lobby(conn_id).await,
            ClientMessage::LeaveLobby => self.leave_lobby(conn_id).await,
            ClientMessage::CreateGame { options } => self.create_game(conn_id, options).await,
            ClientMessage::JoinGame { game_id } => self.join_game(conn_id, game_id).await,
            ClientMessage::LeaveGame => self.leave_game(conn_id).await,
            ClientMessage::GameAction { action } => self.game_action(conn_id, action).await,
            ClientMessage::ChatMessage { text } => self.chat_message(conn_id, text).await,
        }
    }

    /// Sends an `error` event to one connection. Used by transports for
    /// unparseable frames.
    pub async fn send_error(&self, conn_id: ConnectionId, error: impl Into<String>) {
        if let Some(outbound) = self.outbound(conn_id).await {
            let _ = outbound.send(ServerEvent::Error {
                error: error.into(),
            });
        }
    }

    /// Number of registered tables.
    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    // --- handlers ---

    async fn authenticate(&self, conn_id: ConnectionId, token: &str) {
        let Some(outbound) = self.outbound(conn_id).await else {
            return;
        };
        // The verifier may suspend on I/O; no registry lock is held here.
        match self.verifier.verify(token).await {
            Ok(identity) => {
                {
                    let mut connections = self.connections.write().await;
                    if let Some(conn) = connections.get_mut(&conn_id) {
                        conn.identity = Some(identity.clone());
                    }
                }
                self.waiting
                    .write()
                    .await
                    .insert(identity.user_id, outbound.clone());
                info!(
                    "authenticated player {} ({})",
                    identity.user_id, identity.username
                );
                let _ = outbound.send(ServerEvent::AuthSuccess {
                    player_id: identity.user_id,
                    username: identity.username,
                    email: identity.email,
                });
            }
            Err(e) => {
                warn!("authentication failed on {conn_id}: {e}");
                let _ = outbound.send(ServerEvent::AuthError {
                    error: e.to_string(),
                });
            }
        }
    }

    async fn join_lobby(&self, conn_id: ConnectionId) {
        let Some((_, outbound, _)) = self.require_player(conn_id).await else {
            return;
        };
        self.lobby.write().await.insert(conn_id, outbound.clone());
        let games = self.available_games().await;
        let _ = outbound.send(ServerEvent::LobbyUpdate { games });
    }

    async fn leave_lobby(&self, conn_id: ConnectionId) {
        self.lobby.write().await.remove(&conn_id);
    }

    async fn create_game(&self, conn_id: ConnectionId, options: GameOptions) {
        let Some((identity, outbound, current_game)) = self.require_player(conn_id).await else {
            return;
        };
        if current_game.is_some() {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::AlreadyInGame.to_string(),
            });
            return;
        }

        let game_id = Uuid::new_v4();
        let (actor, handle) = TableActor::new(game_id, options);
        tokio::spawn(actor.run());

        // Seat the creator before publishing the table.
        let (tx, rx) = oneshot::channel();
        let sent = handle
            .send(TableMessage::Join {
                player_id: identity.user_id,
                name: identity.username.clone(),
                chips: options.starting_chips,
                outbound: outbound.clone(),
                response: tx,
            })
            .await;
        let joined = match sent {
            Ok(()) => rx.await.ok(),
            Err(_) => None,
        };

        match joined {
            Some(Ok(summary)) => {
                self.games.write().await.insert(game_id, handle);
                self.set_connection_game(conn_id, Some(game_id)).await;
                info!("player {} created game {game_id}", identity.user_id);
                let _ = outbound.send(ServerEvent::GameCreated {
                    game_id,
                    game: summary,
                });
                self.broadcast_lobby().await;
            }
            Some(Err(e)) => {
                let _ = outbound.send(ServerEvent::Error {
                    error: e.to_string(),
                });
            }
            None => {
                let _ = outbound.send(ServerEvent::Error {
                    error: ServerError::GameClosed.to_string(),
                });
            }
        }
    }

    async fn join_game(&self, conn_id: ConnectionId, game_id: GameId) {
        let Some((identity, outbound, current_game)) = self.require_player(conn_id).await else {
            return;
        };
        if current_game.is_some() {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::AlreadyInGame.to_string(),
            });
            return;
        }
        let Some(handle) = self.table_handle(game_id).await else {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::GameNotFound.to_string(),
            });
            return;
        };
        let chips = match self.chip_store.load_starting_chips(identity.user_id).await {
            Ok(chips) => chips,
            Err(e) => {
                let _ = outbound.send(ServerEvent::Error {
                    error: e.to_string(),
                });
                return;
            }
        };

        let (tx, rx) = oneshot::channel();
        if handle
            .send(TableMessage::Join {
                player_id: identity.user_id,
                name: identity.username.clone(),
                chips,
                outbound: outbound.clone(),
                response: tx,
            })
            .await
            .is_err()
        {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::GameClosed.to_string(),
            });
            return;
        }

        match rx.await {
            Ok(Ok(_)) => {
                self.set_connection_game(conn_id, Some(game_id)).await;
                info!("player {} joined game {game_id}", identity.user_id);
                self.broadcast_lobby().await;
            }
            Ok(Err(e)) => {
                let _ = outbound.send(ServerEvent::Error {
                    error: e.to_string(),
                });
            }
            Err(_) => {
                let _ = outbound.send(ServerEvent::Error {
                    error: ServerError::GameClosed.to_string(),
                });
            }
        }
    }

    async fn leave_game(&self, conn_id: ConnectionId) {
        let Some((identity, outbound, current_game)) = self.require_player(conn_id).await else {
            return;
        };
        let Some(game_id) = current_game else {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::NotInGame.to_string(),
            });
            return;
        };
        self.set_connection_game(conn_id, None).await;

        let Some(handle) = self.table_handle(game_id).await else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        if handle
            .send(TableMessage::Leave {
                player_id: identity.user_id,
                response: tx,
            })
            .await
            .is_ok()
            && let Ok(Ok(remaining)) = rx.await
            && remaining == 0
        {
            self.games.write().await.remove(&game_id);
            info!("game {game_id} removed (empty)");
        }
        self.broadcast_lobby().await;
    }

    async fn game_action(&self, conn_id: ConnectionId, action: GameAction) {
        let Some((identity, outbound, current_game)) = self.require_player(conn_id).await else {
            return;
        };
        let Some(game_id) = current_game else {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::NotInGame.to_string(),
            });
            return;
        };
        let Some(handle) = self.table_handle(game_id).await else {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::GameNotFound.to_string(),
            });
            return;
        };

        let (tx, rx) = oneshot::channel();
        if handle
            .send(TableMessage::Action {
                player_id: identity.user_id,
                action,
                response: tx,
            })
            .await
            .is_err()
        {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::GameClosed.to_string(),
            });
            return;
        }
        match rx.await {
            // Success is observed through the table's broadcast.
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!("rejected action from player {}: {e}", identity.user_id);
                let _ = outbound.send(ServerEvent::Error {
                    error: e.to_string(),
                });
            }
            Err(_) => {
                let _ = outbound.send(ServerEvent::Error {
                    error: ServerError::GameClosed.to_string(),
                });
            }
        }
    }

    async fn chat_message(&self, conn_id: ConnectionId, text: String) {
        let Some((identity, outbound, current_game)) = self.require_player(conn_id).await else {
            return;
        };
        let Some(game_id) = current_game else {
            let _ = outbound.send(ServerEvent::Error {
                error: ServerError::NotInGame.to_string(),
            });
            return;
        };
        if let Some(handle) = self.table_handle(game_id).await {
            let _ = handle
                .send(TableMessage::Chat {
                    player_id: identity.user_id,
                    player_name: identity.username.clone(),
                    text,
                })
                .await;
        }
    }

    // --- registry helpers ---

    async fn outbound(&self, conn_id: ConnectionId) -> Option<mpsc::UnboundedSender<ServerEvent>> {
        self.connections
            .read()
            .await
            .get(&conn_id)
            .map(|c| c.outbound.clone())
    }

    /// Resolves an authenticated connection to its identity, outbound
    /// channel, and current game. Unauthenticated connections get an
    /// `error` event and `None`.
    async fn require_player(
        &self,
        conn_id: ConnectionId,
    ) -> Option<(Identity, mpsc::UnboundedSender<ServerEvent>, Option<GameId>)> {
        let connections = self.connections.read().await;
        let conn = connections.get(&conn_id)?;
        let outbound = conn.outbound.clone();
        match &conn.identity {
            Some(identity) => Some((identity.clone(), outbound, conn.game_id)),
            None => {
                let _ = outbound.send(ServerEvent::Error {
                    error: ServerError::NotAuthenticated.to_string(),
                });
                None
            }
        }
    }

    async fn set_connection_game(&self, conn_id: ConnectionId, game_id: Option<GameId>) {
        if let Some(conn) = self.connections.write().await.get_mut(&conn_id) {
            conn.game_id = game_id;
        }
    }

    async fn table_handle(&self, game_id: GameId) -> Option<TableHandle> {
        self.games.read().await.get(&game_id).cloned()
    }

    /// Queries every table actor for a fresh summary.
    async fn available_games(&self) -> Vec<GameSummary> {
        let handles: Vec<TableHandle> = self.games.read().await.values().cloned().collect();
        let mut games = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle.send(TableMessage::Summary { response: tx }).await.is_ok()
                && let Ok(summary) = rx.await
            {
                games.push(summary);
            }
        }
        games.sort_by_key(|g| g.created_at);
        games
    }

    async fn broadcast_lobby(&self) {
        let games = self.available_games().await;
        self.lobby.write().await.retain(|_, tx| {
            tx.send(ServerEvent::AvailableGames {
                games: games.clone(),
            })
            .is_ok()
        });
    }
}
