//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the u64 range, returning 0 for non-finite or negative values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    let clamped = value.min(max).floor();
    cast::<f64, u64>(clamped).unwrap_or(u64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Floor a non-negative angle ratio into a whole rotation count.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = f64::from(u32::MAX);
    cast::<f64, u32>(value.min(max).floor()).unwrap_or(u32::MAX)
}

/// Apply a payout multiplier to a wager, rounding down to whole eggs.
#[must_use]
pub fn payout_for(wager: u64, multiplier: f64) -> u64 {
    floor_f64_to_u64(u64_to_f64(wager) * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_handles_non_finite_and_negative() {
        assert_eq!(floor_f64_to_u64(f64::NAN), 0);
        assert_eq!(floor_f64_to_u64(-3.5), 0);
        assert_eq!(floor_f64_to_u64(f64::INFINITY), 0);
        assert_eq!(floor_f64_to_u64(12.99), 12);
        assert_eq!(floor_f64_to_u64(f64::MAX), u64::MAX);
    }

    #[test]
    fn rotation_floor_counts_whole_turns() {
        assert_eq!(floor_f64_to_u32(719.9 / 360.0), 1);
        assert_eq!(floor_f64_to_u32(720.0 / 360.0), 2);
        assert_eq!(floor_f64_to_u32(f64::NAN), 0);
    }

    #[test]
    fn payout_rounds_down() {
        assert_eq!(payout_for(10, 10.0), 100);
        assert_eq!(payout_for(10, 1.25), 12);
        assert_eq!(payout_for(15, 0.5), 7);
        assert_eq!(payout_for(0, 5.0), 0);
    }
}
