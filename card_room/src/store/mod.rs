//! Chip balance capability.
//!
//! Stacks persist outside the engine; tables only consume a starting chip
//! count through [`ChipStore`]. The in-memory implementation serves tests
//! and development. A persistent one lives with the persistence
//! collaborator and is selected once at startup, never branched on at call
//! time.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::game::constants::DEFAULT_STARTING_CHIPS;
use crate::game::entities::{Chips, PlayerId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chip balance unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChipStore: Send + Sync {
    /// The stack a player sits down with.
    async fn load_starting_chips(&self, player_id: PlayerId) -> Result<Chips, StoreError>;
}

#[derive(Debug)]
pub struct InMemoryChipStore {
    default_stack: Chips,
    balances: RwLock<HashMap<PlayerId, Chips>>,
}

impl InMemoryChipStore {
    #[must_use]
    pub fn new(default_stack: Chips) -> Self {
        Self {
            default_stack,
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub async fn set_balance(&self, player_id: PlayerId, chips: Chips) {
        self.balances.write().await.insert(player_id, chips);
    }
}

impl Default for InMemoryChipStore {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_CHIPS)
    }
}

#[async_trait]
impl ChipStore for InMemoryChipStore {
    async fn load_starting_chips(&self, player_id: PlayerId) -> Result<Chips, StoreError> {
        let balances = self.balances.read().await;
        Ok(balances.get(&player_id).copied().unwrap_or(self.default_stack))
    }
}
