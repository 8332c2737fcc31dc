//! The Texas Hold'em betting engine: a per-table state machine that seats
//! players, posts blinds, deals streets, applies betting actions, and
//! settles the pot at showdown.
//!
//! One pot only: unequal all-in stacks are not split into side pots. The
//! shallow stack can win more than it covered; that matches the system this
//! engine replaces.

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use thiserror::Error;

use super::constants::{DEFAULT_BIG_BLIND, DEFAULT_SMALL_BLIND, DEFAULT_STARTING_CHIPS, HOLE_CARDS, MAX_PLAYERS};
use super::entities::{ActionKind, ActionRecord, Card, Chips, Deck, Player, PlayerId};
use super::eval::{EvalError, HandEvaluation, best_five, compare_hands};
use super::views::{GameStateView, HIDDEN_CARD, PlayerView};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl GamePhase {
    fn is_betting(self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// Table parameters chosen at creation. Antes are carried and echoed in
/// state payloads but are not collected.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
    pub starting_chips: Chips,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            ante: 0,
            starting_chips: DEFAULT_STARTING_CHIPS,
        }
    }
}

#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("need 2+ players to start")]
    NotEnoughPlayers,
    #[error("minimum bet is ${min}")]
    BetBelowMinimum { min: Chips },
    #[error("nothing to call")]
    NothingToCall,
    #[error("cannot check, ${owed} owed")]
    CheckNotAllowed { owed: Chips },
    #[error("{action} not allowed while {phase}")]
    WrongPhase { action: String, phase: GamePhase },
    #[error("not seated at this table")]
    NotSeated,
    #[error("already seated at this table")]
    AlreadySeated,
    #[error("table is full")]
    TableFull,
    #[error("cannot act while folded")]
    ActingWhileFolded,
    #[error("cannot act while all-in")]
    ActingWhileAllIn,
    #[error("no active players at showdown")]
    NoActivePlayers,
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

/// One winner of a settled hand. `hand_name` and `hand` are absent when the
/// pot was awarded without evaluation (everyone else folded).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub player_id: PlayerId,
    pub player_name: String,
    pub win_amount: Chips,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_name: Option<String>,
    pub hand: Vec<String>,
}

#[derive(Debug)]
pub struct HoldemTable {
    options: GameOptions,
    players: Vec<Player>,
    deck: Deck,
    community: Vec<Card>,
    pot: Chips,
    current_bet: Chips,
    current_player_idx: usize,
    button_idx: usize,
    betting_round: u32,
    phase: GamePhase,
    last_raiser: Option<PlayerId>,
    actions: Vec<ActionRecord>,
    winners: Vec<Winner>,
}

impl HoldemTable {
    #[must_use]
    pub fn new(options: GameOptions) -> Self {
        Self {
            options,
            players: Vec::with_capacity(MAX_PLAYERS),
            deck: Deck::default(),
            community: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            current_player_idx: 0,
            button_idx: 0,
            betting_round: 0,
            phase: GamePhase::Waiting,
            last_raiser: None,
            actions: Vec::new(),
            winners: Vec::new(),
        }
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    pub fn button_position(&self) -> usize {
        self.button_idx
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_idx
    }

    pub fn betting_round(&self) -> u32 {
        self.betting_round
    }

    pub fn last_raiser(&self) -> Option<PlayerId> {
        self.last_raiser
    }

    pub fn contains_player(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    /// The player whose turn it is, if a betting round is open.
    pub fn current_player(&self) -> Option<&Player> {
        if self.phase.is_betting() {
            self.players.get(self.current_player_idx)
        } else {
            None
        }
    }

    /// Seats a player. Joining is only possible while the table is waiting
    /// for its first hand.
    pub fn add_player(&mut self, id: PlayerId, name: String, chips: Chips) -> Result<(), TableError> {
        if self.phase != GamePhase::Waiting {
            return Err(TableError::WrongPhase {
                action: "join".to_string(),
                phase: self.phase,
            });
        }
        if self.contains_player(id) {
            return Err(TableError::AlreadySeated);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(TableError::TableFull);
        }
        self.players.push(Player::new(id, name, chips));
        Ok(())
    }

    /// Removes a player from the seat list and returns the remaining seat
    /// count.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<usize, TableError> {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before {
            return Err(TableError::NotSeated);
        }
        if !self.players.is_empty() {
            self.button_idx %= self.players.len();
            self.current_player_idx %= self.players.len();
        }
        Ok(self.players.len())
    }

    /// Starts a new hand: resets per-hand state, advances the button,
    /// shuffles a fresh deck, posts blinds, deals hole cards, and opens the
    /// preflop betting round with the player after the big blind.
    pub fn start_game(&mut self) -> Result<(), TableError> {
        if self.phase.is_betting() {
            return Err(TableError::WrongPhase {
                action: "start_game".to_string(),
                phase: self.phase,
            });
        }
        if self.players.len() < 2 {
            return Err(TableError::NotEnoughPlayers);
        }

        self.community.clear();
        self.pot = 0;
        self.current_bet = self.options.big_blind;
        self.betting_round = 0;
        self.last_raiser = None;
        self.actions.clear();
        self.winners.clear();
        self.button_idx = (self.button_idx + 1) % self.players.len();
        for player in &mut self.players {
            player.reset_for_hand();
        }
        self.deck = Deck::standard();
        self.phase = GamePhase::Preflop;

        self.post_blinds();
        self.deal_hole_cards();
        self.open_betting_round()
    }

    /// Player wagers `amount` on top of what they already have in. The
    /// amount must at least match the current bet; it is capped at the
    /// player's stack.
    pub fn bet(&mut self, player_id: PlayerId, amount: Chips) -> Result<(), TableError> {
        let seat = self.acting_seat(player_id, "bet")?;
        let min = self.current_bet.saturating_sub(self.players[seat].chips_in_pot);
        if amount < min {
            return Err(TableError::BetBelowMinimum { min });
        }
        let paid = self.commit(seat, amount);
        if self.players[seat].chips_in_pot > self.current_bet {
            self.current_bet = self.players[seat].chips_in_pot;
            self.last_raiser = Some(player_id);
        }
        self.record(seat, ActionKind::Bet, Some(paid));
        self.after_action()
    }

    /// Player matches the current bet exactly, capped at their stack. A
    /// short call leaves them all-in.
    pub fn call(&mut self, player_id: PlayerId) -> Result<(), TableError> {
        let seat = self.acting_seat(player_id, "call")?;
        let owed = self.current_bet.saturating_sub(self.players[seat].chips_in_pot);
        if owed == 0 {
            return Err(TableError::NothingToCall);
        }
        let paid = self.commit(seat, owed);
        self.record(seat, ActionKind::Call, Some(paid));
        self.after_action()
    }

    /// Legal only when the player's contribution already matches the
    /// current bet.
    pub fn check(&mut self, player_id: PlayerId) -> Result<(), TableError> {
        let seat = self.acting_seat(player_id, "check")?;
        let owed = self.current_bet.saturating_sub(self.players[seat].chips_in_pot);
        if owed > 0 {
            return Err(TableError::CheckNotAllowed { owed });
        }
        self.record(seat, ActionKind::Check, None);
        self.after_action()
    }

    /// Player forfeits the hand.
    pub fn fold(&mut self, player_id: PlayerId) -> Result<(), TableError> {
        let seat = self.acting_seat(player_id, "fold")?;
        self.players[seat].is_folded = true;
        self.record(seat, ActionKind::Fold, None);
        self.after_action()
    }

    /// Masked state as seen by `viewer`. Hole cards other than the
    /// viewer's own are placeholders; folded players' cards are hidden
    /// entirely. Showdown opens every hand.
    #[must_use]
    pub fn view(&self, viewer: Option<PlayerId>) -> GameStateView {
        let showdown = self.phase == GamePhase::Showdown;
        let players = self
            .players
            .iter()
            .map(|p| {
                let hand = if showdown || viewer == Some(p.id) {
                    p.hand.iter().map(|c| c.code()).collect()
                } else if p.is_folded {
                    Vec::new()
                } else {
                    vec![HIDDEN_CARD.to_string(); p.hand.len()]
                };
                PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    chips: p.chips,
                    chips_in_pot: p.chips_in_pot,
                    hand,
                    has_acted: p.has_acted,
                    is_folded: p.is_folded,
                    is_all_in: p.is_all_in,
                    last_action: p.last_action,
                }
            })
            .collect();
        GameStateView {
            game_state: self.phase,
            players,
            community_cards: self.community.iter().map(|c| c.code()).collect(),
            pot: self.pot,
            current_bet: self.current_bet,
            current_player_index: self.current_player_idx,
            button_position: self.button_idx,
            player_actions: self.actions.clone(),
            winners: self.winners.clone(),
            small_blind: self.options.small_blind,
            big_blind: self.options.big_blind,
            ante: self.options.ante,
        }
    }

    // --- internals ---

    /// Validates the common action contract and resolves the seat index.
    fn acting_seat(&self, player_id: PlayerId, action: &str) -> Result<usize, TableError> {
        if !self.phase.is_betting() {
            return Err(TableError::WrongPhase {
                action: action.to_string(),
                phase: self.phase,
            });
        }
        let seat = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(TableError::NotSeated)?;
        let player = &self.players[seat];
        if player.is_folded {
            return Err(TableError::ActingWhileFolded);
        }
        if player.is_all_in {
            return Err(TableError::ActingWhileAllIn);
        }
        if seat != self.current_player_idx {
            return Err(TableError::NotYourTurn);
        }
        Ok(seat)
    }

    /// Moves up to `amount` from the seat's stack into the pot and returns
    /// what was actually paid. A player whose stack hits zero is all-in.
    fn commit(&mut self, seat: usize, amount: Chips) -> Chips {
        let player = &mut self.players[seat];
        let paid = amount.min(player.chips);
        player.chips -= paid;
        player.chips_in_pot += paid;
        if player.chips == 0 {
            player.is_all_in = true;
        }
        self.pot += paid;
        paid
    }

    fn record(&mut self, seat: usize, action: ActionKind, amount: Option<Chips>) {
        let player = &mut self.players[seat];
        player.has_acted = true;
        player.last_action = Some(action);
        self.actions.push(ActionRecord {
            player_id: player.id,
            action,
            amount,
        });
    }

    fn next_seat(&self, seat: usize) -> usize {
        (seat + 1) % self.players.len()
    }

    /// First seat at or after `start` that can still act.
    fn next_actor_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        (0..n)
            .map(|offset| (start + offset) % n)
            .find(|&seat| self.players[seat].can_act())
    }

    fn post_blinds(&mut self) {
        let small_seat = self.next_seat(self.button_idx);
        let big_seat = self.next_seat(small_seat);
        // Blinds are capped at the payer's stack; a short payer is all-in.
        let small = self.commit(small_seat, self.options.small_blind);
        self.players[small_seat].last_action = Some(ActionKind::SmallBlind);
        self.actions.push(ActionRecord {
            player_id: self.players[small_seat].id,
            action: ActionKind::SmallBlind,
            amount: Some(small),
        });
        let big = self.commit(big_seat, self.options.big_blind);
        self.players[big_seat].last_action = Some(ActionKind::BigBlind);
        self.actions.push(ActionRecord {
            player_id: self.players[big_seat].id,
            action: ActionKind::BigBlind,
            amount: Some(big),
        });
        self.current_bet = big;
    }

    fn deal_hole_cards(&mut self) {
        for seat in 0..self.players.len() {
            let hand = self.deck.deal_multiple(HOLE_CARDS);
            self.players[seat].hand = hand;
        }
    }

    /// Opens a betting round. Preflop action starts after the big blind;
    /// later streets start at the second seat past the button. If nobody
    /// can act (everyone folded or all-in) the round completes immediately,
    /// running the board out.
    fn open_betting_round(&mut self) -> Result<(), TableError> {
        self.betting_round += 1;
        for player in &mut self.players {
            if player.can_act() {
                player.has_acted = false;
            }
        }
        let small_seat = self.next_seat(self.button_idx);
        let big_seat = self.next_seat(small_seat);
        let anchor = if self.phase == GamePhase::Preflop {
            self.next_seat(big_seat)
        } else {
            big_seat
        };
        match self.next_actor_from(anchor) {
            Some(seat) => {
                self.current_player_idx = seat;
                Ok(())
            }
            None => self.end_betting_round(),
        }
    }

    fn after_action(&mut self) -> Result<(), TableError> {
        if self.is_round_complete() {
            self.end_betting_round()
        } else {
            self.advance_turn()
        }
    }

    /// True when every player who can still act has acted and matched the
    /// current bet, or when at most one non-folded player remains.
    fn is_round_complete(&self) -> bool {
        let non_folded = self.players.iter().filter(|p| !p.is_folded).count();
        if non_folded <= 1 {
            return true;
        }
        self.players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.has_acted && p.chips_in_pot == self.current_bet)
    }

    /// Skips folded and all-in seats; looping back to the current seat
    /// without finding an eligible actor forces the round to completion.
    fn advance_turn(&mut self) -> Result<(), TableError> {
        match self.next_actor_from(self.next_seat(self.current_player_idx)) {
            Some(seat) if seat != self.current_player_idx => {
                self.current_player_idx = seat;
                Ok(())
            }
            _ => self.end_betting_round(),
        }
    }

    fn end_betting_round(&mut self) -> Result<(), TableError> {
        let non_folded = self.players.iter().filter(|p| !p.is_folded).count();
        if non_folded <= 1 {
            return self.settle();
        }
        match self.phase {
            GamePhase::Preflop => self.deal_street(GamePhase::Flop, 3),
            GamePhase::Flop => self.deal_street(GamePhase::Turn, 1),
            GamePhase::Turn => self.deal_street(GamePhase::River, 1),
            GamePhase::River => self.settle(),
            GamePhase::Waiting | GamePhase::Showdown => Ok(()),
        }
    }

    fn deal_street(&mut self, next: GamePhase, count: usize) -> Result<(), TableError> {
        self.deck.burn();
        let mut dealt = self.deck.deal_multiple(count);
        self.community.append(&mut dealt);
        self.phase = next;
        self.open_betting_round()
    }

    /// Showdown: one survivor takes the pot without evaluation; otherwise
    /// the best 5-of-7 hands split it, remainder to the first winner in
    /// seat order.
    fn settle(&mut self) -> Result<(), TableError> {
        let active: Vec<usize> = (0..self.players.len())
            .filter(|&seat| !self.players[seat].is_folded)
            .collect();

        if active.is_empty() {
            // Table stays in its last consistent state.
            return Err(TableError::NoActivePlayers);
        }

        if let [seat] = active.as_slice() {
            let seat = *seat;
            let amount = self.pot;
            self.phase = GamePhase::Showdown;
            self.players[seat].chips += amount;
            self.winners.push(Winner {
                player_id: self.players[seat].id,
                player_name: self.players[seat].name.clone(),
                win_amount: amount,
                hand_name: None,
                hand: Vec::new(),
            });
            self.pot = 0;
            return Ok(());
        }

        let mut evaluations: Vec<(usize, HandEvaluation)> = Vec::with_capacity(active.len());
        for &seat in &active {
            let mut cards = self.players[seat].hand.clone();
            cards.extend(self.community.iter().cloned());
            evaluations.push((seat, best_five(&cards)?));
        }
        let best = evaluations
            .iter()
            .map(|(_, e)| e)
            .max()
            .cloned()
            .ok_or(TableError::NoActivePlayers)?;
        let winners: Vec<(usize, HandEvaluation)> = evaluations
            .into_iter()
            .filter(|(_, e)| compare_hands(e, &best) == Ordering::Equal)
            .collect();

        self.phase = GamePhase::Showdown;
        let share = self.pot / winners.len() as Chips;
        let remainder = self.pot % winners.len() as Chips;
        for (i, (seat, evaluation)) in winners.into_iter().enumerate() {
            let amount = share + if i == 0 { remainder } else { 0 };
            self.players[seat].chips += amount;
            self.winners.push(Winner {
                player_id: self.players[seat].id,
                player_name: self.players[seat].name.clone(),
                win_amount: amount,
                hand_name: Some(evaluation.name.to_string()),
                hand: evaluation.cards.iter().map(|c| c.code()).collect(),
            });
        }
        self.pot = 0;
        Ok(())
    }
}
