use rand::Rng;
use serde::{Deserialize, Serialize};

use super::animator::{SpinState, SpinStep, SpinTuning};
use super::resolver::resolve;
use super::selector::select_outcome;
use super::table::{WheelTable, forward_distance};
use crate::error::CasinoError;
use crate::numbers::payout_for;
use crate::wallet::Wallet;

/// Result of a finished spin, reported once per spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub tier_name: String,
    pub tier_index: usize,
    pub multiplier: f64,
    pub wager: u64,
    pub payout: u64,
    pub final_angle: f64,
    /// Resolved by an interrupt rather than by easing to rest.
    pub cancelled: bool,
    pub frames: u32,
    pub total_rotation: f64,
    /// Full turns completed when easing began; `None` if cancelled before that.
    pub eased_after_rotations: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveSpin {
    state: SpinState,
    wager: u64,
}

/// The prize wheel: resting angle plus at most one in-flight spin.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSession {
    table: WheelTable,
    tuning: SpinTuning,
    resting_angle: f64,
    active: Option<ActiveSpin>,
}

impl WheelSession {
    #[must_use]
    pub const fn new(table: WheelTable, tuning: SpinTuning) -> Self {
        Self {
            table,
            tuning,
            resting_angle: 0.0,
            active: None,
        }
    }

    #[must_use]
    pub const fn table(&self) -> &WheelTable {
        &self.table
    }

    #[must_use]
    pub const fn tuning(&self) -> &SpinTuning {
        &self.tuning
    }

    /// Angle the renderer should draw this frame.
    #[must_use]
    pub fn current_angle(&self) -> f64 {
        self.active
            .as_ref()
            .map_or(self.resting_angle, |spin| spin.state.current_angle())
    }

    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.active.is_some()
    }

    /// Animation state of the in-flight spin, if any.
    #[must_use]
    pub fn spin_state(&self) -> Option<&SpinState> {
        self.active.as_ref().map(|spin| &spin.state)
    }

    /// Debit the wager and commit a new spin.
    ///
    /// # Errors
    ///
    /// Returns [`CasinoError::ZeroWager`], [`CasinoError::SpinInProgress`] or
    /// [`CasinoError::InsufficientEggs`]; in every case nothing is debited.
    pub fn start_spin<R: Rng + ?Sized>(
        &mut self,
        wager: u64,
        wallet: &mut Wallet,
        rng: &mut R,
    ) -> Result<&SpinState, CasinoError> {
        if wager == 0 {
            return Err(CasinoError::ZeroWager);
        }
        if self.active.is_some() {
            return Err(CasinoError::SpinInProgress);
        }
        wallet.debit(wager)?;

        let draw = select_outcome(self.table.tiers(), rng);
        let state = SpinState::begin(self.resting_angle, draw, &self.tuning);
        if let Some(tier) = self.table.tier(draw.tier_index) {
            log::info!(
                "wheel spin: target '{}' ({}x) at {:.1}°, start {:.1}°, {:.1}° ahead, close={}",
                tier.name,
                tier.multiplier,
                state.target_angle(),
                state.start_angle(),
                forward_distance(state.start_angle(), state.target_angle()),
                state.started_close_to_target()
            );
        }
        let active = self.active.insert(ActiveSpin { state, wager });
        Ok(&active.state)
    }

    /// Step the in-flight spin by one frame. Returns the outcome on the frame it lands.
    pub fn advance(&mut self, dt: f64) -> Option<SpinOutcome> {
        let spin = self.active.as_mut()?;
        match spin.state.advance(dt, &self.tuning) {
            SpinStep::Landed | SpinStep::Idle => self.finish(false),
            SpinStep::Spinning | SpinStep::BeganEasing | SpinStep::Easing => None,
        }
    }

    /// Force the in-flight spin onto its committed target and pay it out.
    pub fn cancel_spin(&mut self) -> Option<SpinOutcome> {
        let spin = self.active.as_mut()?;
        spin.state.snap_to_target();
        self.finish(true)
    }

    fn finish(&mut self, cancelled: bool) -> Option<SpinOutcome> {
        let ActiveSpin { state, wager } = self.active.take()?;
        self.resting_angle = state.target_angle();

        let committed = state.tier_index();
        if let Some(resolution) = resolve(state.current_angle(), self.table.tiers())
            && resolution.tier_index != committed
        {
            log::warn!(
                "wheel stopped at {:.3}° which resolves to tier {} but tier {committed} was committed; paying committed tier",
                state.current_angle(),
                resolution.tier_index
            );
        }

        let tier = self.table.tier(committed)?;
        let payout = payout_for(wager, tier.multiplier);
        log::info!(
            "wheel landed on '{}' ({}x): wager {wager}, payout {payout}{}",
            tier.name,
            tier.multiplier,
            if cancelled { " (cancelled)" } else { "" }
        );
        Some(SpinOutcome {
            tier_name: tier.name.clone(),
            tier_index: committed,
            multiplier: tier.multiplier,
            wager,
            payout,
            final_angle: state.current_angle(),
            cancelled,
            frames: state.frames(),
            total_rotation: state.total_rotation(),
            eased_after_rotations: state.eased_after_rotations(),
        })
    }
}

impl Default for WheelSession {
    fn default() -> Self {
        Self::new(WheelTable::default(), SpinTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const FRAME: f64 = 1.0 / 60.0;

    fn spin_to_rest(session: &mut WheelSession) -> SpinOutcome {
        for _ in 0..10_000 {
            if let Some(outcome) = session.advance(FRAME) {
                return outcome;
            }
        }
        panic!("spin never resolved");
    }

    #[test]
    fn start_debits_before_outcome_is_known() {
        let mut session = WheelSession::default();
        let mut wallet = Wallet::new(50);
        let mut rng = SmallRng::seed_from_u64(1);
        session.start_spin(20, &mut wallet, &mut rng).unwrap();
        assert_eq!(wallet.balance(), 30);
        assert!(session.is_spinning());
    }

    #[test]
    fn rejects_second_spin_and_bad_wagers_without_debit() {
        let mut session = WheelSession::default();
        let mut wallet = Wallet::new(15);
        let mut rng = SmallRng::seed_from_u64(2);
        assert_eq!(
            session.start_spin(0, &mut wallet, &mut rng).unwrap_err(),
            CasinoError::ZeroWager
        );
        assert_eq!(
            session.start_spin(20, &mut wallet, &mut rng).unwrap_err(),
            CasinoError::InsufficientEggs {
                balance: 15,
                wager: 20
            }
        );
        session.start_spin(10, &mut wallet, &mut rng).unwrap();
        assert_eq!(
            session.start_spin(5, &mut wallet, &mut rng).unwrap_err(),
            CasinoError::SpinInProgress
        );
        assert_eq!(wallet.balance(), 5);
    }

    #[test]
    fn outcome_reports_once_and_wheel_rests_on_target() {
        let mut session = WheelSession::default();
        let mut wallet = Wallet::new(100);
        let mut rng = SmallRng::seed_from_u64(3);
        let target = session
            .start_spin(10, &mut wallet, &mut rng)
            .unwrap()
            .target_angle();
        let required = session
            .spin_state()
            .unwrap()
            .required_rotations(session.tuning());
        let outcome = spin_to_rest(&mut session);
        assert!(!outcome.cancelled);
        assert!(outcome.eased_after_rotations.is_some_and(|turns| turns >= required));
        assert!((outcome.final_angle - target).abs() < f64::EPSILON);
        assert!((session.current_angle() - target).abs() < f64::EPSILON);
        assert!(!session.is_spinning());
        assert!(session.advance(FRAME).is_none());
        assert!(session.cancel_spin().is_none());
        assert_eq!(
            outcome.payout,
            payout_for(10, session.table().tiers()[outcome.tier_index].multiplier)
        );
    }

    #[test]
    fn next_spin_starts_from_previous_rest() {
        let mut session = WheelSession::default();
        let mut wallet = Wallet::new(100);
        let mut rng = SmallRng::seed_from_u64(4);
        session.start_spin(10, &mut wallet, &mut rng).unwrap();
        let first = spin_to_rest(&mut session);
        let state = session.start_spin(10, &mut wallet, &mut rng).unwrap();
        assert!((state.start_angle() - first.final_angle).abs() < f64::EPSILON);
    }

    #[test]
    fn cancel_pays_committed_tier() {
        let mut session = WheelSession::default();
        let mut wallet = Wallet::new(100);
        let mut rng = SmallRng::seed_from_u64(5);
        let committed = session
            .start_spin(10, &mut wallet, &mut rng)
            .unwrap()
            .tier_index();
        session.advance(FRAME);
        let outcome = session.cancel_spin().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.tier_index, committed);
        assert_eq!(outcome.eased_after_rotations, None);
    }
}
