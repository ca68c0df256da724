use thiserror::Error;

/// Runtime errors surfaced to the caller when a wager cannot be placed.
///
/// None of these occur mid-round: every check runs before eggs are debited.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CasinoError {
    #[error("wager must be at least one egg")]
    ZeroWager,
    #[error("insufficient eggs: balance {balance}, wager {wager}")]
    InsufficientEggs { balance: u64, wager: u64 },
    #[error("a wheel spin is already in progress")]
    SpinInProgress,
    #[error("pocket {number} is not on a {pockets}-pocket wheel")]
    InvalidPocket { number: u8, pockets: u8 },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
}

/// Errors raised when a fixed-odds minigame is configured inconsistently.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameConfigError {
    #[error("{game} config has no {what}")]
    Empty {
        game: &'static str,
        what: &'static str,
    },
    #[error("{game} multiplier must be finite and non-negative (got {value})")]
    InvalidMultiplier { game: &'static str, value: f64 },
    #[error("{game} {field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        game: &'static str,
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("wager {field} must be at least one egg")]
    ZeroWagerRule { field: &'static str },
}

pub(crate) fn check_multiplier(game: &'static str, value: f64) -> Result<(), GameConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GameConfigError::InvalidMultiplier { game, value })
    }
}
