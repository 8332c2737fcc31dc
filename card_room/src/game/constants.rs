//! Table limits and defaults.

use super::entities::Chips;

/// Number of cards in a standard deck (jokers excluded).
pub const DECK_SIZE: usize = 52;

/// Maximum number of seats at a single table.
pub const MAX_PLAYERS: usize = 10;

/// Hole cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Community cards dealt across all streets.
pub const BOARD_SIZE: usize = 5;

/// Cards in a ranked poker hand.
pub const HAND_SIZE: usize = 5;

pub const DEFAULT_SMALL_BLIND: Chips = 10;
pub const DEFAULT_BIG_BLIND: Chips = 20;
pub const DEFAULT_STARTING_CHIPS: Chips = 1000;
