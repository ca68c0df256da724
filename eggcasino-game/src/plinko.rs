//! Plinko: balls bounce down a peg board and land on a multiplier.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    PLINKO_COLUMNS, PLINKO_DEFAULT_MULTIPLIERS, PLINKO_ROWS, PLINKO_STRAIGHT_CHANCE,
};
use crate::error::{CasinoError, GameConfigError, check_multiplier};
use crate::numbers::{floor_f64_to_u64, u64_to_f64};
use crate::wallet::Wallet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoConfig {
    #[serde(default = "PlinkoConfig::default_rows")]
    pub rows: u32,
    /// Board width in peg columns; balls start in the middle column.
    #[serde(default = "PlinkoConfig::default_columns")]
    pub columns: i32,
    /// Chance a ball falls straight through a row instead of deflecting.
    #[serde(default = "PlinkoConfig::default_straight_chance")]
    pub straight_chance: f64,
    #[serde(default = "PlinkoConfig::default_multipliers")]
    pub multipliers: Vec<f64>,
}

impl PlinkoConfig {
    const fn default_rows() -> u32 {
        PLINKO_ROWS
    }

    const fn default_columns() -> i32 {
        PLINKO_COLUMNS
    }

    const fn default_straight_chance() -> f64 {
        PLINKO_STRAIGHT_CHANCE
    }

    fn default_multipliers() -> Vec<f64> {
        PLINKO_DEFAULT_MULTIPLIERS.to_vec()
    }

    /// Validate board shape and bucket multipliers.
    ///
    /// # Errors
    ///
    /// Returns a [`GameConfigError`] when the board has no rows or columns,
    /// the straight chance is not a probability, or a multiplier is invalid.
    pub fn validate(&self) -> Result<(), GameConfigError> {
        if self.rows == 0 {
            return Err(GameConfigError::Empty {
                game: "plinko",
                what: "rows",
            });
        }
        if self.columns <= 0 {
            return Err(GameConfigError::Empty {
                game: "plinko",
                what: "columns",
            });
        }
        if !(0.0..=1.0).contains(&self.straight_chance) {
            return Err(GameConfigError::RangeViolation {
                game: "plinko",
                field: "straight_chance",
                min: 0.0,
                max: 1.0,
                value: self.straight_chance,
            });
        }
        if self.multipliers.is_empty() {
            return Err(GameConfigError::Empty {
                game: "plinko",
                what: "multipliers",
            });
        }
        self.multipliers
            .iter()
            .try_for_each(|value| check_multiplier("plinko", *value))
    }
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        Self {
            rows: Self::default_rows(),
            columns: Self::default_columns(),
            straight_chance: Self::default_straight_chance(),
            multipliers: Self::default_multipliers(),
        }
    }
}

/// How many balls to drop and what each one stakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlinkoBet {
    pub balls: u32,
    pub eggs_per_ball: u64,
}

impl PlinkoBet {
    #[must_use]
    pub const fn stake(&self) -> u64 {
        self.eggs_per_ball.saturating_mul(self.balls as u64)
    }
}

/// Column visited after each row, for the renderer, and the bucket it paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallDrop {
    pub path: SmallVec<[i32; 12]>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlinkoOutcome {
    pub drops: Vec<BallDrop>,
    pub stake: u64,
    pub payout: u64,
}

/// Bounce one ball down the board.
pub fn drop_ball<R: Rng + ?Sized>(config: &PlinkoConfig, rng: &mut R) -> BallDrop {
    let last_column = config.columns.saturating_sub(1).max(0);
    let mut column = last_column / 2;
    let mut path = SmallVec::new();
    path.push(column);
    for _ in 1..config.rows {
        if !rng.gen_bool(config.straight_chance.clamp(0.0, 1.0)) {
            let direction = if rng.gen_bool(0.5) { -1 } else { 1 };
            column = (column + direction).clamp(0, last_column);
        }
        path.push(column);
    }
    let multiplier = config.multipliers.choose(rng).copied().unwrap_or(0.0);
    BallDrop { path, multiplier }
}

/// Debit the full stake, drop every ball, and credit the combined winnings.
///
/// # Errors
///
/// Returns [`CasinoError::MinViolation`] for zero balls or zero eggs per
/// ball, and [`CasinoError::InsufficientEggs`] when the stake is not covered.
pub fn play_plinko<R: Rng + ?Sized>(
    config: &PlinkoConfig,
    bet: PlinkoBet,
    wallet: &mut Wallet,
    rng: &mut R,
) -> Result<PlinkoOutcome, CasinoError> {
    if bet.balls == 0 {
        return Err(CasinoError::MinViolation {
            field: "balls",
            min: 1,
            value: 0,
        });
    }
    if bet.eggs_per_ball == 0 {
        return Err(CasinoError::MinViolation {
            field: "eggs_per_ball",
            min: 1,
            value: 0,
        });
    }
    let stake = bet.stake();
    wallet.debit(stake)?;

    let drops: Vec<BallDrop> = (0..bet.balls).map(|_| drop_ball(config, rng)).collect();
    let stake_per_ball = u64_to_f64(bet.eggs_per_ball);
    let winnings: f64 = drops
        .iter()
        .map(|ball| stake_per_ball * ball.multiplier)
        .sum();
    let payout = floor_f64_to_u64(winnings);
    wallet.credit(payout);
    log::debug!("plinko {} balls x {} eggs -> payout {payout}", bet.balls, bet.eggs_per_ball);
    Ok(PlinkoOutcome {
        drops,
        stake,
        payout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn balls_stay_on_the_board() {
        let config = PlinkoConfig::default();
        let mut rng = SmallRng::seed_from_u64(21);
        for _ in 0..500 {
            let ball = drop_ball(&config, &mut rng);
            assert_eq!(ball.path.len(), 10);
            assert_eq!(ball.path[0], 5);
            assert!(ball.path.iter().all(|column| (0..11).contains(column)));
            assert!(
                ball.path
                    .windows(2)
                    .all(|pair| (pair[0] - pair[1]).abs() <= 1)
            );
            assert!(config.multipliers.contains(&ball.multiplier));
        }
    }

    #[test]
    fn payout_sums_fractional_winnings_before_flooring() {
        let config = PlinkoConfig {
            multipliers: vec![0.5],
            ..PlinkoConfig::default()
        };
        let mut wallet = Wallet::new(10);
        let mut rng = SmallRng::seed_from_u64(3);
        let bet = PlinkoBet {
            balls: 3,
            eggs_per_ball: 3,
        };
        let outcome = play_plinko(&config, bet, &mut wallet, &mut rng).unwrap();
        assert_eq!(outcome.stake, 9);
        assert_eq!(outcome.payout, 4);
        assert_eq!(wallet.balance(), 5);
        assert_eq!(outcome.drops.len(), 3);
    }

    #[test]
    fn rejects_empty_bets_and_overdrafts() {
        let config = PlinkoConfig::default();
        let mut wallet = Wallet::new(10);
        let mut rng = SmallRng::seed_from_u64(4);
        let no_balls = PlinkoBet {
            balls: 0,
            eggs_per_ball: 1,
        };
        assert!(matches!(
            play_plinko(&config, no_balls, &mut wallet, &mut rng),
            Err(CasinoError::MinViolation { field: "balls", .. })
        ));
        let too_big = PlinkoBet {
            balls: 2,
            eggs_per_ball: 6,
        };
        assert!(matches!(
            play_plinko(&config, too_big, &mut wallet, &mut rng),
            Err(CasinoError::InsufficientEggs { .. })
        ));
        assert_eq!(wallet.balance(), 10);
    }

    #[test]
    fn validation_rejects_bad_boards() {
        assert_eq!(PlinkoConfig::default().validate(), Ok(()));
        let bad_chance = PlinkoConfig {
            straight_chance: 1.5,
            ..PlinkoConfig::default()
        };
        assert!(matches!(
            bad_chance.validate(),
            Err(GameConfigError::RangeViolation { .. })
        ));
        let negative = PlinkoConfig {
            multipliers: vec![1.0, -2.0],
            ..PlinkoConfig::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(GameConfigError::InvalidMultiplier { .. })
        ));
    }
}
