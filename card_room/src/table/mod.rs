//! Per-table actors.
//!
//! Each table runs as one tokio task that owns its [`HoldemTable`]
//! exclusively. All mutation flows through the actor's inbox and is applied
//! strictly in arrival order; masked views are broadcast to subscribers
//! before the next message is processed.
//!
//! [`HoldemTable`]: crate::game::holdem::HoldemTable

pub mod actor;
pub mod messages;

pub use actor::{TableActor, TableHandle};
