//! Table actor: the single writer for one table's state.

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::mpsc;

use super::messages::TableMessage;
use crate::game::constants::MAX_PLAYERS;
use crate::game::entities::{Chips, PlayerId};
use crate::game::holdem::{GameOptions, GamePhase, HoldemTable, TableError};
use crate::net::messages::{GameAction, GameId, GameSummary, ServerEvent};

/// Handle for sending messages to a table actor. The registry owns the
/// long-lived clones; the actor exits when the last one is dropped.
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    game_id: GameId,
}

impl TableHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "table is closed".to_string())
    }
}

/// Actor owning a single table. All mutation happens inside `run`, one
/// message at a time; broadcasts for a mutation are sent before the next
/// message is read, so subscribers observe updates in action order.
pub struct TableActor {
    game_id: GameId,
    created_at: DateTime<Utc>,
    table: HoldemTable,
    inbox: mpsc::Receiver<TableMessage>,
    subscribers: HashMap<PlayerId, mpsc::UnboundedSender<ServerEvent>>,
}

impl TableActor {
    #[must_use]
    pub fn new(game_id: GameId, options: GameOptions) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let actor = Self {
            game_id,
            created_at: Utc::now(),
            table: HoldemTable::new(options),
            inbox,
            subscribers: HashMap::new(),
        };
        let handle = TableHandle { sender, game_id };
        (actor, handle)
    }

    pub async fn run(mut self) {
        info!(
            "table {} open, blinds ${}/{}",
            self.game_id,
            self.table.options().small_blind,
            self.table.options().big_blind
        );
        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
        }
        info!("table {} closed", self.game_id);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                player_id,
                name,
                chips,
                outbound,
                response,
            } => {
                let result = self.handle_join(player_id, name, chips, outbound);
                let _ = response.send(result);
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.handle_leave(player_id);
                let _ = response.send(result);
            }

            TableMessage::Action {
                player_id,
                action,
                response,
            } => {
                let result = self.handle_action(player_id, action);
                let _ = response.send(result);
            }

            TableMessage::Chat {
                player_id,
                player_name,
                text,
            } => {
                self.broadcast(ServerEvent::ChatMessage {
                    player_id,
                    player_name,
                    message: text,
                    timestamp: Utc::now(),
                });
            }

            TableMessage::GetView { viewer, response } => {
                let _ = response.send(self.table.view(viewer));
            }

            TableMessage::Summary { response } => {
                let _ = response.send(self.summary());
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                debug!(
                    "player {player_id} unsubscribed from table {}",
                    self.game_id
                );
            }
        }
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: String,
        chips: Chips,
        outbound: mpsc::UnboundedSender<ServerEvent>,
    ) -> Result<GameSummary, TableError> {
        if self.table.contains_player(player_id) {
            // A seated player with a live subscription is a duplicate
            // join; one whose connection died is re-attaching.
            if self
                .subscribers
                .get(&player_id)
                .is_some_and(|tx| !tx.is_closed())
            {
                return Err(TableError::AlreadySeated);
            }
            let _ = outbound.send(ServerEvent::GameState {
                state: self.table.view(Some(player_id)),
            });
            self.subscribers.insert(player_id, outbound);
            debug!("player {player_id} re-attached to table {}", self.game_id);
            return Ok(self.summary());
        }

        self.table.add_player(player_id, name.clone(), chips)?;
        self.subscribers.insert(player_id, outbound);
        info!(
            "player {player_id} ({name}) joined table {} with {chips} chips",
            self.game_id
        );

        let summary = self.summary();
        self.broadcast(ServerEvent::PlayerJoined {
            player_id,
            player_name: name,
            game: summary.clone(),
        });
        if let Some(tx) = self.subscribers.get(&player_id) {
            let _ = tx.send(ServerEvent::GameState {
                state: self.table.view(Some(player_id)),
            });
        }
        Ok(summary)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<usize, TableError> {
        let remaining = self.table.remove_player(player_id)?;
        self.subscribers.remove(&player_id);
        info!("player {player_id} left table {}", self.game_id);

        let summary = self.summary();
        self.broadcast(ServerEvent::PlayerLeft {
            player_id,
            game: summary,
        });
        Ok(remaining)
    }

    fn handle_action(
        &mut self,
        player_id: PlayerId,
        action: GameAction,
    ) -> Result<(), TableError> {
        let result = match action {
            GameAction::StartGame => self.table.start_game(),
            GameAction::Bet { amount } => self.table.bet(player_id, amount),
            GameAction::Call => self.table.call(player_id),
            GameAction::Check => self.table.check(player_id),
            GameAction::Fold => self.table.fold(player_id),
        };
        match result {
            Ok(()) => {
                debug!(
                    "table {}: player {player_id} {action}, now {}",
                    self.game_id,
                    self.table.phase()
                );
                self.broadcast_update();
                if self.table.phase() == GamePhase::Showdown && !self.table.winners().is_empty() {
                    self.broadcast(ServerEvent::GameOver {
                        winners: self.table.winners().to_vec(),
                        game_id: self.game_id,
                    });
                }
                Ok(())
            }
            // Validation errors go back to the offender alone; the table
            // and everyone else's view are untouched.
            Err(e) => Err(e),
        }
    }

    fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.game_id,
            player_count: self.table.players().len(),
            max_players: MAX_PLAYERS,
            small_blind: self.table.options().small_blind,
            big_blind: self.table.options().big_blind,
            game_state: self.table.phase(),
            created_at: self.created_at,
        }
    }

    /// Sends `event` to every subscriber, dropping the ones that hung up.
    fn broadcast(&mut self, event: ServerEvent) {
        self.subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Sends each subscriber the state as masked for them.
    fn broadcast_update(&mut self) {
        let table = &self.table;
        self.subscribers.retain(|player_id, tx| {
            tx.send(ServerEvent::GameUpdate {
                state: table.view(Some(*player_id)),
            })
            .is_ok()
        });
    }
}
