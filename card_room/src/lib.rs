//! # Card Room
//!
//! The real-time engine behind a multiplayer card game: cards and decks,
//! five-card poker hand ranking, a Texas Hold'em betting state machine, and
//! a game server that multiplexes many tables over persistent client
//! connections.
//!
//! ## Architecture
//!
//! - [`game`]: the engine itself. [`game::entities`] (cards, decks,
//!   players), [`game::eval`] (hand ranking with a bit-packed total order),
//!   [`game::holdem`] (the per-table betting state machine), and
//!   [`game::views`] (per-recipient masked state).
//! - [`table`]: one actor task per table; all mutation of a table flows
//!   through its inbox and is applied strictly in arrival order.
//! - [`net`]: the JSON wire protocol and the [`GameServer`] registry that
//!   routes client messages to table actors and broadcasts masked state.
//! - [`auth`] / [`store`]: capability interfaces for the external
//!   collaborators, token verification and persisted chip balances.
//!
//! ## Example
//!
//! ```
//! use card_room::eval::{HandName, evaluate_hand};
//!
//! let cards: Vec<card_room::entities::Card> = ["Th", "Jh", "Qh", "Kh", "Ah"]
//!     .iter()
//!     .map(|c| c.parse().unwrap())
//!     .collect();
//! let result = evaluate_hand(&cards).unwrap();
//! assert_eq!(result.name, HandName::RoyalFlush);
//! ```

pub mod auth;
pub mod game;
pub mod net;
pub mod store;
pub mod table;

pub use game::{
    constants::{self, DEFAULT_STARTING_CHIPS, MAX_PLAYERS},
    entities, eval,
    holdem::{GameOptions, GamePhase, HoldemTable, TableError, Winner},
    views,
};
pub use net::{
    messages::{self, ClientMessage, GameAction, GameId, GameSummary, ServerEvent},
    server::{ConnectionId, GameServer, ServerError},
};
