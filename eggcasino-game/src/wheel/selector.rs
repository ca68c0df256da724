use rand::Rng;
use rand::seq::SliceRandom;

use super::table::{AngleRange, PrizeTier};
use crate::constants::FULL_TURN_DEG;

/// A committed wheel outcome: the tier that pays and the angle the wheel will stop on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDraw {
    pub tier_index: usize,
    pub angle: f64,
    /// The uniform draw that picked the tier.
    pub roll: f64,
}

/// Pick a tier by cumulative probability, then a stopping angle inside it.
///
/// Never fails: if rounding leaves the roll above the final cumulative sum
/// the last tier is chosen.
#[must_use]
pub fn select_outcome<R: Rng + ?Sized>(tiers: &[PrizeTier], rng: &mut R) -> WheelDraw {
    let roll = rng.r#gen::<f64>();
    let tier_index = tier_for_roll(tiers, roll);
    let angle = tiers
        .get(tier_index)
        .map_or(0.0, |tier| angle_within_tier(tier, rng));
    WheelDraw {
        tier_index,
        angle,
        roll,
    }
}

/// Index of the first tier whose running probability sum reaches `roll`.
#[must_use]
pub fn tier_for_roll(tiers: &[PrizeTier], roll: f64) -> usize {
    let mut cumulative = 0.0;
    for (index, tier) in tiers.iter().enumerate() {
        cumulative += tier.probability;
        if cumulative >= roll {
            return index;
        }
    }
    tiers.len().saturating_sub(1)
}

/// Uniform angle inside one of the tier's arcs, chosen uniformly by arc (not by length).
pub fn angle_within_tier<R: Rng + ?Sized>(tier: &PrizeTier, rng: &mut R) -> f64 {
    match tier.ranges.as_slice() {
        [only] => angle_within_range(*only, rng),
        ranges => ranges
            .choose(rng)
            .map_or(0.0, |range| angle_within_range(*range, rng)),
    }
}

fn angle_within_range<R: Rng + ?Sized>(range: AngleRange, rng: &mut R) -> f64 {
    if range.wraps() {
        if rng.gen_bool(0.5) {
            rng.gen_range(range.start..FULL_TURN_DEG)
        } else {
            rng.gen_range(0.0..=range.end)
        }
    } else if range.end >= FULL_TURN_DEG {
        // 360° would normalize onto whichever tier owns 0°.
        rng.gen_range(range.start..FULL_TURN_DEG)
    } else {
        rng.gen_range(range.start..=range.end)
    }
}
