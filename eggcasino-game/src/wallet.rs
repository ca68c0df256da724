//! Egg balance shared by every minigame.
use serde::{Deserialize, Serialize};

use crate::error::CasinoError;

/// Persistent egg currency. The serialized shape matches the flat save record
/// (`{"total_eggs": N}`); reading and writing that record is the host's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default)]
    pub total_eggs: u64,
}

impl Wallet {
    #[must_use]
    pub const fn new(total_eggs: u64) -> Self {
        Self { total_eggs }
    }

    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.total_eggs
    }

    #[must_use]
    pub const fn can_afford(&self, amount: u64) -> bool {
        self.total_eggs >= amount
    }

    /// Remove `amount` eggs.
    ///
    /// # Errors
    ///
    /// Returns [`CasinoError::InsufficientEggs`] when the balance does not cover
    /// the amount; the balance is left untouched.
    pub fn debit(&mut self, amount: u64) -> Result<(), CasinoError> {
        if !self.can_afford(amount) {
            return Err(CasinoError::InsufficientEggs {
                balance: self.total_eggs,
                wager: amount,
            });
        }
        self.total_eggs -= amount;
        Ok(())
    }

    /// Add `amount` eggs, saturating at `u64::MAX`.
    pub const fn credit(&mut self, amount: u64) {
        self.total_eggs = self.total_eggs.saturating_add(amount);
    }
}
