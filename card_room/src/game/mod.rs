//! The card game engine: cards, decks, hand evaluation, and the Hold'em
//! betting state machine, plus the masked views derived from table state.

pub mod constants;
pub mod entities;
pub mod eval;
pub mod holdem;
pub mod views;
