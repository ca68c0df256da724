//! Centralized tuning constants for the casino minigames.
//!
//! Wheel animation defaults are mirrored by `SpinTuning::default()`; the
//! remaining values describe the fixed-odds games and have no external
//! configuration surface.

// Prize wheel --------------------------------------------------------------
pub const FULL_TURN_DEG: f64 = 360.0;
pub(crate) const WHEEL_SPIN_SPEED_DPS: f64 = 360.0;
pub(crate) const WHEEL_EASE_WINDOW_DEG: f64 = 120.0;
pub(crate) const WHEEL_MIN_EASE_SPEED_DPS: f64 = 30.0;
pub(crate) const WHEEL_SNAP_EPSILON_DEG: f64 = 0.1;
pub(crate) const WHEEL_CLOSE_TARGET_DEG: f64 = 120.0;
pub(crate) const WHEEL_CLOSE_ROTATIONS: u32 = 2;
pub(crate) const WHEEL_FAR_ROTATIONS: u32 = 3;
pub(crate) const WHEEL_MAX_FRAME_DELTA_SECS: f64 = 0.25;
pub(crate) const WHEEL_PROBABILITY_TOLERANCE: f64 = 1e-6;
pub(crate) const WHEEL_PARTITION_TOLERANCE: f64 = 1e-6;

// Wagers -------------------------------------------------------------------
pub(crate) const WAGER_DEFAULT: u64 = 10;
pub(crate) const WAGER_STEP: u64 = 10;
pub(crate) const WAGER_MIN: u64 = 10;

// Slots --------------------------------------------------------------------
pub const SLOT_REELS: usize = 3;
pub(crate) const SLOT_TRIPLE_FACTOR: f64 = 3.0;
pub(crate) const SLOT_PAIR_FACTOR: f64 = 1.0;
pub(crate) const SLOT_MISS_MULTIPLIER: f64 = 0.5;

// Roulette -----------------------------------------------------------------
pub const ROULETTE_POCKETS: u8 = 37;
pub(crate) const ROULETTE_COLOR_PAYOUT: u64 = 2;
pub(crate) const ROULETTE_NUMBER_PAYOUT: u64 = 35;

// Plinko -------------------------------------------------------------------
pub(crate) const PLINKO_ROWS: u32 = 10;
pub(crate) const PLINKO_COLUMNS: i32 = 11;
pub(crate) const PLINKO_STRAIGHT_CHANCE: f64 = 0.7;
pub(crate) const PLINKO_DEFAULT_MULTIPLIERS: [f64; 5] = [0.5, 1.0, 2.0, 5.0, 10.0];
