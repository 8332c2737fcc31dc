//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{Chips, PlayerId};
use crate::game::holdem::TableError;
use crate::game::views::GameStateView;
use crate::net::messages::{GameAction, GameSummary, ServerEvent};

/// Messages that can be sent to a [`TableActor`].
///
/// [`TableActor`]: super::actor::TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Seat a player (or re-attach a disconnected one). The `outbound`
    /// channel becomes the player's subscription for table broadcasts.
    Join {
        player_id: PlayerId,
        name: String,
        chips: Chips,
        outbound: mpsc::UnboundedSender<ServerEvent>,
        response: oneshot::Sender<Result<GameSummary, TableError>>,
    },

    /// Unseat a player. Responds with the remaining seat count so the
    /// registry can delete an empty table.
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<Result<usize, TableError>>,
    },

    /// Apply a game action (start_game, bet, call, check, fold).
    Action {
        player_id: PlayerId,
        action: GameAction,
        response: oneshot::Sender<Result<(), TableError>>,
    },

    /// Relay a chat line to everyone at the table.
    Chat {
        player_id: PlayerId,
        player_name: String,
        text: String,
    },

    /// Masked state for one recipient.
    GetView {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<GameStateView>,
    },

    /// Lobby summary of this table.
    Summary {
        response: oneshot::Sender<GameSummary>,
    },

    /// Drop a player's subscription without unseating them (used on
    /// disconnect).
    Unsubscribe { player_id: PlayerId },
}
