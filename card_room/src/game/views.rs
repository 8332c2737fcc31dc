//! Per-recipient masked views of table state.
//!
//! Views are what leave the engine: the requesting player sees their own
//! hole cards, everyone else's are replaced with opaque placeholders, and a
//! folded player's cards are hidden entirely. At showdown all hands are
//! open.

use serde::{Deserialize, Serialize};

use super::entities::{ActionKind, ActionRecord, Chips, PlayerId};
use super::holdem::{GamePhase, Winner};

/// Placeholder for a hole card the recipient is not allowed to see.
pub const HIDDEN_CARD: &str = "??";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub chips_in_pot: Chips,
    /// Card codes for the requesting player, placeholders for others,
    /// empty for folded players.
    pub hand: Vec<String>,
    pub has_acted: bool,
    pub is_folded: bool,
    pub is_all_in: bool,
    pub last_action: Option<ActionKind>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub game_state: GamePhase,
    pub players: Vec<PlayerView>,
    pub community_cards: Vec<String>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub current_player_index: usize,
    pub button_position: usize,
    pub player_actions: Vec<ActionRecord>,
    pub winners: Vec<Winner>,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
}
