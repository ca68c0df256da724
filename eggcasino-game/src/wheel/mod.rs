//! Prize wheel: section table, outcome selection, spin animation and resolution.
//!
//! The outcome is committed when a spin starts. The animation only decides
//! how the wheel travels there, so cancelling a spin can never change what it
//! pays.

mod animator;
mod resolver;
mod selector;
mod session;
mod table;

pub use animator::{SpinPhase, SpinState, SpinStep, SpinTuning, TuningError};
pub use resolver::{Resolution, resolve};
pub use selector::{WheelDraw, angle_within_tier, select_outcome, tier_for_roll};
pub use session::{SpinOutcome, WheelSession};
pub use table::{
    AngleRange, PrizeTier, WheelConfigError, WheelTable, forward_distance, normalize_angle,
};
