//! Egg Casino Game Engine
//!
//! Platform-agnostic casino logic for the Snake egg economy: the prize wheel,
//! slots, roulette and plinko, all wagering against one egg wallet.
//! This crate has no rendering, windowing or save-file dependencies; hosts feed
//! it input events and frame deltas and draw whatever state it exposes.

pub mod casino;
pub mod constants;
pub mod error;
pub mod input;
pub mod numbers;
pub mod plinko;
pub mod rng;
pub mod roulette;
pub mod slots;
pub mod wager;
pub mod wallet;
pub mod wheel;

// Re-export commonly used types
pub use casino::{Casino, CasinoConfig, CasinoConfigError, SpinListener, TableSignal};
pub use error::{CasinoError, GameConfigError};
pub use input::{InputEvent, InputQueue, Key, MouseButton};
pub use plinko::{BallDrop, PlinkoBet, PlinkoConfig, PlinkoOutcome, drop_ball, play_plinko};
pub use rng::{CountingRng, RngBundle};
pub use roulette::{
    PocketColor, RouletteOutcome, RouletteTicket, RouletteWin, play_roulette, settle,
};
pub use slots::{
    Fruit, SlotSymbol, SlotsConfig, SlotsMatch, SlotsOutcome, evaluate, play_slots, spin_reels,
};
pub use wager::{Wager, WagerPolicy};
pub use wallet::Wallet;
pub use wheel::{
    AngleRange, PrizeTier, Resolution, SpinOutcome, SpinPhase, SpinState, SpinStep, SpinTuning,
    TuningError, WheelConfigError, WheelDraw, WheelSession, WheelTable, resolve, select_outcome,
};
