//! Wager sizing rules for the bet up/down controls.
use serde::{Deserialize, Serialize};

use crate::constants::{WAGER_DEFAULT, WAGER_MIN, WAGER_STEP};
use crate::error::GameConfigError;

/// How the raise/lower controls move the current wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WagerPolicy {
    /// Add or remove a fixed number of eggs per press.
    FixedStep { step: u64, min: u64 },
    /// Double on raise, halve on lower.
    Doubling { min: u64 },
}

impl WagerPolicy {
    #[must_use]
    pub const fn min(&self) -> u64 {
        match *self {
            Self::FixedStep { min, .. } | Self::Doubling { min } => min,
        }
    }

    /// A zero minimum or step would leave the wager stuck at zero.
    ///
    /// # Errors
    ///
    /// Returns [`GameConfigError::ZeroWagerRule`] naming the zero field.
    pub const fn validate(&self) -> Result<(), GameConfigError> {
        match *self {
            Self::FixedStep { step: 0, .. } => Err(GameConfigError::ZeroWagerRule { field: "step" }),
            Self::FixedStep { min: 0, .. } | Self::Doubling { min: 0 } => {
                Err(GameConfigError::ZeroWagerRule { field: "min" })
            }
            Self::FixedStep { .. } | Self::Doubling { .. } => Ok(()),
        }
    }
}

impl Default for WagerPolicy {
    fn default() -> Self {
        Self::FixedStep {
            step: WAGER_STEP,
            min: WAGER_MIN,
        }
    }
}

/// Current wager plus the policy used to adjust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    amount: u64,
    policy: WagerPolicy,
}

impl Wager {
    #[must_use]
    pub fn new(amount: u64, policy: WagerPolicy) -> Self {
        Self {
            amount: amount.max(policy.min()),
            policy,
        }
    }

    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    #[must_use]
    pub const fn policy(&self) -> WagerPolicy {
        self.policy
    }

    /// Raise the wager, never past the player's balance.
    ///
    /// A balance below the policy minimum leaves the wager unchanged.
    pub fn raise(&mut self, balance: u64) -> u64 {
        let raised = match self.policy {
            WagerPolicy::FixedStep { step, .. } => self.amount.saturating_add(step),
            WagerPolicy::Doubling { .. } => self.amount.saturating_mul(2),
        };
        if balance >= self.policy.min() {
            self.amount = raised.min(balance);
        }
        self.amount
    }

    /// Lower the wager, never below the policy minimum.
    pub fn lower(&mut self) -> u64 {
        let lowered = match self.policy {
            WagerPolicy::FixedStep { step, .. } => self.amount.saturating_sub(step),
            WagerPolicy::Doubling { .. } => self.amount / 2,
        };
        self.amount = lowered.max(self.policy.min());
        self.amount
    }
}

impl Default for Wager {
    fn default() -> Self {
        Self::new(WAGER_DEFAULT, WagerPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_clamps_to_balance_and_minimum() {
        let mut wager = Wager::default();
        assert_eq!(wager.amount(), 10);
        assert_eq!(wager.raise(100), 20);
        assert_eq!(wager.raise(25), 25);
        assert_eq!(wager.raise(25), 25);
        assert_eq!(wager.lower(), 15);
        assert_eq!(wager.lower(), 10);
        assert_eq!(wager.lower(), 10);
    }

    #[test]
    fn doubling_policy_scales_geometrically() {
        let mut wager = Wager::new(10, WagerPolicy::Doubling { min: 5 });
        assert_eq!(wager.raise(1_000), 20);
        assert_eq!(wager.raise(1_000), 40);
        assert_eq!(wager.raise(50), 50);
        assert_eq!(wager.lower(), 25);
        assert_eq!(wager.lower(), 12);
        assert_eq!(wager.lower(), 6);
        assert_eq!(wager.lower(), 5);
    }

    #[test]
    fn raise_is_ignored_when_balance_below_minimum() {
        let mut wager = Wager::default();
        assert_eq!(wager.raise(3), 10);
    }

    #[test]
    fn new_enforces_policy_minimum() {
        let wager = Wager::new(1, WagerPolicy::FixedStep { step: 5, min: 10 });
        assert_eq!(wager.amount(), 10);
        let policy: WagerPolicy =
            serde_json::from_str(r#"{"kind":"doubling","min":2}"#).unwrap();
        assert_eq!(policy, WagerPolicy::Doubling { min: 2 });
    }

    #[test]
    fn zero_minimum_or_step_is_rejected() {
        assert_eq!(WagerPolicy::default().validate(), Ok(()));
        assert_eq!(
            WagerPolicy::Doubling { min: 0 }.validate(),
            Err(GameConfigError::ZeroWagerRule { field: "min" })
        );
        assert_eq!(
            WagerPolicy::FixedStep { step: 10, min: 0 }.validate(),
            Err(GameConfigError::ZeroWagerRule { field: "min" })
        );
        assert_eq!(
            WagerPolicy::FixedStep { step: 0, min: 10 }.validate(),
            Err(GameConfigError::ZeroWagerRule { field: "step" })
        );
    }
}
