//! The wire protocol: JSON messages exchanged with clients over a
//! websocket, one `"type"`-tagged object per text frame.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::game::entities::{Chips, PlayerId};
use crate::game::holdem::{GameOptions, GamePhase, Winner};
use crate::game::views::GameStateView;

/// Type alias for table identifiers handed out on `create_game`.
pub type GameId = Uuid;

/// A message from a client to the game server.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Authenticate {
        token: String,
    },
    JoinLobby,
    LeaveLobby,
    CreateGame {
        #[serde(flatten)]
        options: GameOptions,
    },
    JoinGame {
        game_id: GameId,
    },
    LeaveGame,
    GameAction {
        action: GameAction,
    },
    ChatMessage {
        text: String,
    },
}

/// A table action carried inside `game_action`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    StartGame,
    Bet { amount: Chips },
    Call,
    Check,
    Fold,
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::StartGame => "start_game",
            Self::Bet { .. } => "bet",
            Self::Call => "call",
            Self::Check => "check",
            Self::Fold => "fold",
        };
        write!(f, "{repr}")
    }
}

/// An event from the game server to a client.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    AuthSuccess {
        player_id: PlayerId,
        username: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    AuthError {
        error: String,
    },
    /// Snapshot sent to a connection entering the lobby.
    LobbyUpdate {
        games: Vec<GameSummary>,
    },
    /// Broadcast to the lobby whenever any table's membership changes.
    AvailableGames {
        games: Vec<GameSummary>,
    },
    GameCreated {
        game_id: GameId,
        game: GameSummary,
    },
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
        game: GameSummary,
    },
    PlayerLeft {
        player_id: PlayerId,
        game: GameSummary,
    },
    /// Full masked state, sent to a player entering a game.
    GameState {
        state: GameStateView,
    },
    /// Masked state broadcast after every applied action.
    GameUpdate {
        state: GameStateView,
    },
    GameOver {
        winners: Vec<Winner>,
        game_id: GameId,
    },
    ChatMessage {
        player_id: PlayerId,
        player_name: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        error: String,
    },
}

/// What the lobby knows about a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_id: GameId,
    pub player_count: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub game_state: GamePhase,
    pub created_at: DateTime<Utc>,
}
