//! The casino table: one owned context that routes input to the wheel and
//! runs the fixed-odds minigames against a shared wallet.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CasinoError, GameConfigError};
use crate::input::{InputEvent, InputQueue, Key};
use crate::plinko::{PlinkoBet, PlinkoConfig, PlinkoOutcome, play_plinko};
use crate::rng::RngBundle;
use crate::roulette::{PocketColor, RouletteOutcome, RouletteTicket, play_roulette};
use crate::slots::{SlotsConfig, SlotsOutcome, play_slots};
use crate::wager::{Wager, WagerPolicy};
use crate::wallet::Wallet;
use crate::wheel::{
    SpinOutcome, SpinTuning, TuningError, WheelConfigError, WheelSession, WheelTable,
};

/// Errors raised when a [`CasinoConfig`] cannot drive a table.
#[derive(Debug, Error)]
pub enum CasinoConfigError {
    #[error("wheel table: {0}")]
    Wheel(#[from] WheelConfigError),
    #[error("spin tuning: {0}")]
    Tuning(#[from] TuningError),
    #[error(transparent)]
    Game(#[from] GameConfigError),
    #[error("failed to parse casino config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every tunable for the table. Missing sections fall back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasinoConfig {
    #[serde(default)]
    pub wheel: WheelTable,
    #[serde(default)]
    pub tuning: SpinTuning,
    #[serde(default)]
    pub slots: SlotsConfig,
    #[serde(default)]
    pub plinko: PlinkoConfig,
    #[serde(default)]
    pub wager: WagerPolicy,
}

impl CasinoConfig {
    /// Parse and validate a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CasinoConfigError`] when parsing fails or any section is invalid.
    pub fn from_json(json: &str) -> Result<Self, CasinoConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The wheel table validates itself on construction; this checks the rest.
    ///
    /// # Errors
    ///
    /// Returns the first invalid section as a [`CasinoConfigError`].
    pub fn validate(&self) -> Result<(), CasinoConfigError> {
        self.tuning.validate()?;
        self.slots.validate()?;
        self.plinko.validate()?;
        self.wager.validate()?;
        Ok(())
    }
}

/// What the table did in response to one input event.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSignal {
    /// The event had no effect.
    Ignored,
    SpinStarted { wager: u64 },
    WagerChanged { amount: u64 },
    /// The action was refused before any eggs moved.
    Rejected(CasinoError),
    /// The host should leave the table. Carries the outcome of a spin the
    /// exit interrupted, already credited.
    Exit { cancelled: Option<SpinOutcome> },
}

/// Observer notified whenever a wheel spin resolves and has been paid.
pub trait SpinListener {
    fn on_spin_resolved(&mut self, outcome: &SpinOutcome);
}

impl<F> SpinListener for F
where
    F: FnMut(&SpinOutcome),
{
    fn on_spin_resolved(&mut self, outcome: &SpinOutcome) {
        self(outcome);
    }
}

pub struct Casino {
    wallet: Wallet,
    wager: Wager,
    rng: RngBundle,
    wheel: WheelSession,
    slots: SlotsConfig,
    plinko: PlinkoConfig,
    listeners: Vec<Box<dyn SpinListener>>,
}

impl fmt::Debug for Casino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Casino")
            .field("wallet", &self.wallet)
            .field("wager", &self.wager)
            .field("wheel", &self.wheel)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Casino {
    /// Open a table with `wallet`, seeding every game stream from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`CasinoConfigError`] when `config` fails validation.
    pub fn new(
        seed: u64,
        wallet: Wallet,
        config: CasinoConfig,
    ) -> Result<Self, CasinoConfigError> {
        config.validate()?;
        let CasinoConfig {
            wheel,
            tuning,
            slots,
            plinko,
            wager,
        } = config;
        log::debug!(
            "casino opened: seed {seed}, {} eggs, {} wheel tiers",
            wallet.balance(),
            wheel.len()
        );
        Ok(Self {
            wallet,
            wager: Wager::new(wager.min(), wager),
            rng: RngBundle::from_user_seed(seed),
            wheel: WheelSession::new(wheel, tuning),
            slots,
            plinko,
            listeners: Vec::new(),
        })
    }

    /// Open a table with the built-in configuration.
    #[must_use]
    pub fn with_defaults(seed: u64, wallet: Wallet) -> Self {
        Self {
            wallet,
            wager: Wager::default(),
            rng: RngBundle::from_user_seed(seed),
            wheel: WheelSession::default(),
            slots: SlotsConfig::default(),
            plinko: PlinkoConfig::default(),
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub const fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    #[must_use]
    pub const fn wager(&self) -> &Wager {
        &self.wager
    }

    #[must_use]
    pub const fn wheel(&self) -> &WheelSession {
        &self.wheel
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    pub fn subscribe(&mut self, listener: Box<dyn SpinListener>) {
        self.listeners.push(listener);
    }

    /// Apply one input event.
    pub fn handle_input(&mut self, event: InputEvent) -> TableSignal {
        match event {
            InputEvent::KeyDown {
                key: Key::Space | Key::Enter,
            } => self.start_spin(),
            InputEvent::KeyDown { key: Key::Up } if !self.wheel.is_spinning() => {
                let amount = self.wager.raise(self.wallet.balance());
                TableSignal::WagerChanged { amount }
            }
            InputEvent::KeyDown { key: Key::Down } if !self.wheel.is_spinning() => {
                let amount = self.wager.lower();
                TableSignal::WagerChanged { amount }
            }
            InputEvent::KeyDown { key: Key::Escape } => TableSignal::Exit {
                cancelled: self.cancel_spin(),
            },
            InputEvent::Quit => TableSignal::Exit { cancelled: None },
            InputEvent::KeyDown { .. }
            | InputEvent::MouseMove { .. }
            | InputEvent::MouseDown { .. } => TableSignal::Ignored,
        }
    }

    /// Apply every queued event, in order.
    pub fn pump(&mut self, queue: &mut InputQueue) -> Vec<TableSignal> {
        queue.drain().map(|event| self.handle_input(event)).collect()
    }

    /// Advance the wheel by one frame, paying out on the frame it lands.
    pub fn tick(&mut self, dt: f64) -> Option<SpinOutcome> {
        let outcome = self.wheel.advance(dt)?;
        self.settle(&outcome);
        Some(outcome)
    }

    /// Interrupt the active spin, if any, and pay its committed tier.
    pub fn cancel_spin(&mut self) -> Option<SpinOutcome> {
        let outcome = self.wheel.cancel_spin()?;
        self.settle(&outcome);
        Some(outcome)
    }

    /// # Errors
    ///
    /// See [`play_slots`].
    pub fn play_slots(&mut self) -> Result<SlotsOutcome, CasinoError> {
        play_slots(
            &self.slots,
            self.wager.amount(),
            &mut self.wallet,
            self.rng.slots(),
        )
    }

    /// Bet the current wager on a colour and a pocket number.
    ///
    /// # Errors
    ///
    /// See [`play_roulette`].
    pub fn play_roulette(
        &mut self,
        color: PocketColor,
        number: u8,
    ) -> Result<RouletteOutcome, CasinoError> {
        let ticket = RouletteTicket {
            wager: self.wager.amount(),
            color,
            number,
        };
        play_roulette(&ticket, &mut self.wallet, self.rng.roulette())
    }

    /// # Errors
    ///
    /// See [`play_plinko`].
    pub fn play_plinko(&mut self, bet: PlinkoBet) -> Result<PlinkoOutcome, CasinoError> {
        play_plinko(&self.plinko, bet, &mut self.wallet, self.rng.plinko())
    }

    fn start_spin(&mut self) -> TableSignal {
        let wager = self.wager.amount();
        match self
            .wheel
            .start_spin(wager, &mut self.wallet, self.rng.wheel())
        {
            Ok(_) => TableSignal::SpinStarted { wager },
            Err(err) => {
                log::debug!("spin refused: {err}");
                TableSignal::Rejected(err)
            }
        }
    }

    fn settle(&mut self, outcome: &SpinOutcome) {
        self.wallet.credit(outcome.payout);
        for listener in &mut self.listeners {
            listener.on_spin_resolved(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: f64 = 1.0 / 60.0;

    fn run_until_landed(casino: &mut Casino) -> SpinOutcome {
        for _ in 0..10_000 {
            if let Some(outcome) = casino.tick(FRAME) {
                return outcome;
            }
        }
        panic!("spin never landed");
    }

    #[test]
    fn space_starts_spin_and_tick_pays_out() {
        let mut casino = Casino::with_defaults(7, Wallet::new(100));
        assert_eq!(
            casino.handle_input(InputEvent::key(Key::Space)),
            TableSignal::SpinStarted { wager: 10 }
        );
        assert_eq!(casino.wallet().balance(), 90);
        let outcome = run_until_landed(&mut casino);
        assert_eq!(casino.wallet().balance(), 90 + outcome.payout);
        assert!(casino.tick(FRAME).is_none());
    }

    #[test]
    fn wager_controls_are_locked_while_spinning() {
        let mut casino = Casino::with_defaults(1, Wallet::new(100));
        assert_eq!(
            casino.handle_input(InputEvent::key(Key::Up)),
            TableSignal::WagerChanged { amount: 20 }
        );
        casino.handle_input(InputEvent::key(Key::Enter));
        assert_eq!(
            casino.handle_input(InputEvent::key(Key::Down)),
            TableSignal::Ignored
        );
        assert_eq!(casino.wager().amount(), 20);
        assert_eq!(
            casino.handle_input(InputEvent::key(Key::Space)),
            TableSignal::Rejected(CasinoError::SpinInProgress)
        );
    }

    #[test]
    fn escape_cancels_pays_and_exits() {
        let mut casino = Casino::with_defaults(3, Wallet::new(50));
        casino.handle_input(InputEvent::key(Key::Space));
        casino.tick(FRAME);
        let TableSignal::Exit {
            cancelled: Some(outcome),
        } = casino.handle_input(InputEvent::key(Key::Escape))
        else {
            panic!("escape during a spin should cancel it");
        };
        assert!(outcome.cancelled);
        assert_eq!(casino.wallet().balance(), 40 + outcome.payout);
        assert!(!casino.wheel().is_spinning());
    }

    #[test]
    fn listeners_hear_each_resolution_once() {
        let mut casino = Casino::with_defaults(11, Wallet::new(100));
        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&heard);
        casino.subscribe(Box::new(move |outcome: &SpinOutcome| {
            sink.borrow_mut().push(outcome.payout);
        }));
        let mut queue = InputQueue::new();
        queue.push(InputEvent::MouseMove { x: 3, y: 3 });
        queue.push(InputEvent::key(Key::Space));
        let signals = casino.pump(&mut queue);
        assert_eq!(
            signals,
            vec![TableSignal::Ignored, TableSignal::SpinStarted { wager: 10 }]
        );
        let outcome = run_until_landed(&mut casino);
        assert_eq!(*heard.borrow(), vec![outcome.payout]);
    }

    #[test]
    fn broke_player_is_rejected_without_debit() {
        let mut casino = Casino::with_defaults(5, Wallet::new(4));
        assert_eq!(
            casino.handle_input(InputEvent::key(Key::Space)),
            TableSignal::Rejected(CasinoError::InsufficientEggs {
                balance: 4,
                wager: 10
            })
        );
        assert_eq!(casino.wallet().balance(), 4);
        assert_eq!(
            casino.handle_input(InputEvent::Quit),
            TableSignal::Exit { cancelled: None }
        );
    }

    #[test]
    fn minigames_draw_from_their_own_streams() {
        let mut casino = Casino::with_defaults(9, Wallet::new(1_000));
        casino.play_slots().unwrap();
        casino.play_roulette(PocketColor::Black, 17).unwrap();
        casino
            .play_plinko(PlinkoBet {
                balls: 2,
                eggs_per_ball: 5,
            })
            .unwrap();
        let mut played = casino.rng().clone();
        let mut fresh = RngBundle::from_user_seed(9);
        assert!(played.slots().draws() > 0);
        assert_eq!(played.wheel().draws(), 0);
        assert_eq!(played.wheel().next_u64(), fresh.wheel().next_u64());
    }

    #[test]
    fn config_sections_default_independently() {
        let config = CasinoConfig::from_json(r#"{"wager":{"kind":"doubling","min":5}}"#).unwrap();
        assert_eq!(config.wager, WagerPolicy::Doubling { min: 5 });
        assert_eq!(config.slots, SlotsConfig::default());
        let casino = Casino::new(1, Wallet::new(10), config).unwrap();
        assert_eq!(casino.wager().amount(), 5);

        let bad = r#"{"tuning":{"spin_speed_dps":0.0}}"#;
        assert!(matches!(
            CasinoConfig::from_json(bad),
            Err(CasinoConfigError::Tuning(TuningError::NonPositive { .. }))
        ));
    }

    #[test]
    fn config_rejects_unplayable_tables() {
        assert!(matches!(
            CasinoConfig::from_json(r#"{"tuning":{"spin_speed_dps":1440}}"#),
            Err(CasinoConfigError::Tuning(TuningError::FrameOvershoot { .. }))
        ));
        assert!(matches!(
            CasinoConfig::from_json(r#"{"wager":{"kind":"doubling","min":0}}"#),
            Err(CasinoConfigError::Game(GameConfigError::ZeroWagerRule { field: "min" }))
        ));
        assert!(matches!(
            CasinoConfig::from_json(r#"{"wager":{"kind":"fixed_step","step":0,"min":10}}"#),
            Err(CasinoConfigError::Game(GameConfigError::ZeroWagerRule { field: "step" }))
        ));
    }
}
