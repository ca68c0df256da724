//! Three-reel fruit slot machine.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::{SLOT_MISS_MULTIPLIER, SLOT_PAIR_FACTOR, SLOT_REELS, SLOT_TRIPLE_FACTOR};
use crate::error::{CasinoError, GameConfigError, check_multiplier};
use crate::numbers::payout_for;
use crate::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fruit {
    Lemon,
    Cherry,
    Orange,
    Banana,
    Grape,
    Strawberry,
    Melon,
}

impl Fruit {
    pub const ALL: [Self; 7] = [
        Self::Lemon,
        Self::Cherry,
        Self::Orange,
        Self::Banana,
        Self::Grape,
        Self::Strawberry,
        Self::Melon,
    ];

    #[must_use]
    pub const fn default_multiplier(self) -> f64 {
        match self {
            Self::Lemon => 1.25,
            Self::Cherry => 1.5,
            Self::Orange => 2.0,
            Self::Banana => 2.5,
            Self::Grape => 3.0,
            Self::Strawberry => 5.0,
            Self::Melon => 7.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotSymbol {
    pub fruit: Fruit,
    pub multiplier: f64,
}

/// Reel strip shared by all three reels; each symbol is equally likely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotsConfig {
    #[serde(default = "SlotsConfig::default_symbols")]
    pub symbols: Vec<SlotSymbol>,
    /// Paid when all three reels differ.
    #[serde(default = "SlotsConfig::default_miss_multiplier")]
    pub miss_multiplier: f64,
}

impl SlotsConfig {
    fn default_symbols() -> Vec<SlotSymbol> {
        Fruit::ALL
            .into_iter()
            .map(|fruit| SlotSymbol {
                fruit,
                multiplier: fruit.default_multiplier(),
            })
            .collect()
    }

    const fn default_miss_multiplier() -> f64 {
        SLOT_MISS_MULTIPLIER
    }

    /// Validate the reel strip.
    ///
    /// # Errors
    ///
    /// Returns a [`GameConfigError`] for an empty strip or a negative/non-finite multiplier.
    pub fn validate(&self) -> Result<(), GameConfigError> {
        if self.symbols.is_empty() {
            return Err(GameConfigError::Empty {
                game: "slots",
                what: "symbols",
            });
        }
        for symbol in &self.symbols {
            check_multiplier("slots", symbol.multiplier)?;
        }
        check_multiplier("slots", self.miss_multiplier)
    }

    #[must_use]
    pub fn multiplier_for(&self, fruit: Fruit) -> f64 {
        self.symbols
            .iter()
            .find(|symbol| symbol.fruit == fruit)
            .map_or(0.0, |symbol| symbol.multiplier)
    }
}

impl Default for SlotsConfig {
    fn default() -> Self {
        Self {
            symbols: Self::default_symbols(),
            miss_multiplier: Self::default_miss_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotsMatch {
    Triple(Fruit),
    Pair(Fruit),
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotsOutcome {
    pub reels: [Fruit; SLOT_REELS],
    pub matched: SlotsMatch,
    pub multiplier: f64,
    pub wager: u64,
    pub payout: u64,
}

/// Stop every reel on a uniformly chosen symbol.
pub fn spin_reels<R: Rng + ?Sized>(config: &SlotsConfig, rng: &mut R) -> [Fruit; SLOT_REELS] {
    std::array::from_fn(|_| {
        config
            .symbols
            .choose(rng)
            .map_or(Fruit::Lemon, |symbol| symbol.fruit)
    })
}

/// Classify a reel line and price it.
#[must_use]
pub fn evaluate(config: &SlotsConfig, reels: [Fruit; SLOT_REELS]) -> (SlotsMatch, f64) {
    let [a, b, c] = reels;
    if a == b && b == c {
        (
            SlotsMatch::Triple(a),
            config.multiplier_for(a) * SLOT_TRIPLE_FACTOR,
        )
    } else if a == b || a == c {
        (SlotsMatch::Pair(a), config.multiplier_for(a) * SLOT_PAIR_FACTOR)
    } else if b == c {
        (SlotsMatch::Pair(b), config.multiplier_for(b) * SLOT_PAIR_FACTOR)
    } else {
        (SlotsMatch::Miss, config.miss_multiplier)
    }
}

/// Debit the wager, spin, and credit the winnings.
///
/// # Errors
///
/// Returns [`CasinoError::ZeroWager`] or [`CasinoError::InsufficientEggs`]
/// before any eggs move.
pub fn play_slots<R: Rng + ?Sized>(
    config: &SlotsConfig,
    wager: u64,
    wallet: &mut Wallet,
    rng: &mut R,
) -> Result<SlotsOutcome, CasinoError> {
    if wager == 0 {
        return Err(CasinoError::ZeroWager);
    }
    wallet.debit(wager)?;
    let reels = spin_reels(config, rng);
    let (matched, multiplier) = evaluate(config, reels);
    let payout = payout_for(wager, multiplier);
    wallet.credit(payout);
    log::debug!("slots {reels:?} -> {matched:?} ({multiplier}x), payout {payout}");
    Ok(SlotsOutcome {
        reels,
        matched,
        multiplier,
        wager,
        payout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn triple_pays_three_times_symbol() {
        let config = SlotsConfig::default();
        let (matched, multiplier) = evaluate(&config, [Fruit::Melon; 3]);
        assert_eq!(matched, SlotsMatch::Triple(Fruit::Melon));
        assert!((multiplier - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn pair_pays_paired_symbol_in_any_position() {
        let config = SlotsConfig::default();
        for reels in [
            [Fruit::Grape, Fruit::Grape, Fruit::Lemon],
            [Fruit::Grape, Fruit::Lemon, Fruit::Grape],
            [Fruit::Lemon, Fruit::Grape, Fruit::Grape],
        ] {
            let (matched, multiplier) = evaluate(&config, reels);
            assert_eq!(matched, SlotsMatch::Pair(Fruit::Grape));
            assert!((multiplier - 3.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn miss_pays_consolation() {
        let config = SlotsConfig::default();
        let (matched, multiplier) =
            evaluate(&config, [Fruit::Lemon, Fruit::Cherry, Fruit::Orange]);
        assert_eq!(matched, SlotsMatch::Miss);
        assert!((multiplier - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn play_moves_eggs_through_wallet() {
        let config = SlotsConfig::default();
        let mut wallet = Wallet::new(100);
        let mut rng = SmallRng::seed_from_u64(9);
        let outcome = play_slots(&config, 20, &mut wallet, &mut rng).unwrap();
        assert_eq!(wallet.balance(), 100 - 20 + outcome.payout);
        assert_eq!(outcome.payout, payout_for(20, outcome.multiplier));
        assert_eq!(
            play_slots(&config, 500, &mut wallet, &mut rng).unwrap_err(),
            CasinoError::InsufficientEggs {
                balance: wallet.balance(),
                wager: 500
            }
        );
    }

    #[test]
    fn validation_catches_empty_strip() {
        let config = SlotsConfig {
            symbols: Vec::new(),
            ..SlotsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameConfigError::Empty { game: "slots", .. })
        ));
        assert_eq!(SlotsConfig::default().validate(), Ok(()));
    }
}
