use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use eggcasino_game::numbers::{payout_for, u64_to_f64};
use eggcasino_game::wheel::{SpinOutcome, SpinPhase, WheelSession, resolve};
use eggcasino_game::{
    PlinkoBet, PlinkoConfig, PocketColor, RngBundle, RouletteTicket, RouletteWin, SlotsConfig,
    SlotsMatch, SpinTuning, Wallet, WheelTable, play_plinko, play_roulette, play_slots,
};

use crate::util::ratio;

const MAX_FRAMES_PER_SPIN: u32 = 100_000;
const ANGLE_TOLERANCE: f64 = 1e-9;
const MIN_SPINS_FOR_RATE_CHECK: u32 = 1_000;
const RATE_TOLERANCE_SIGMAS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Wheel,
    Slots,
    Roulette,
    Plinko,
}

impl GameKind {
    pub const ALL: [Self; 4] = [Self::Wheel, Self::Slots, Self::Roulette, Self::Plinko];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Slots => "slots",
            Self::Roulette => "roulette",
            Self::Plinko => "plinko",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Wheel => "Prize wheel: animation, rotation gate, resolver and tier rates",
            Self::Slots => "Three-reel fruit slots: line rates and return to player",
            Self::Roulette => "Single-zero roulette: colour and number hits",
            Self::Plinko => "Plinko: ball paths and bucket multipliers",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|game| game.key().eq_ignore_ascii_case(key))
    }
}

/// Shared knobs for every simulated game.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub spins: u32,
    pub wager: u64,
    pub fps: f64,
    /// Cancel each wheel spin after this many frames instead of letting it land.
    pub cancel_after: Option<u32>,
    pub table: WheelTable,
    pub tuning: SpinTuning,
    pub slots: SlotsConfig,
    pub plinko: PlinkoConfig,
}

impl SimulationPlan {
    fn frame_delta(&self) -> f64 {
        1.0 / self.fps
    }

    fn bankroll(&self) -> u64 {
        self.wager.saturating_mul(u64::from(self.spins))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub game: GameKind,
    pub seed: u64,
    pub rounds: u64,
    pub wagered: u64,
    pub paid: u64,
    pub return_to_player: f64,
    /// Configured return for the wheel; the other games have none.
    pub expected_return: Option<f64>,
    pub hits: BTreeMap<String, u64>,
    pub failures: Vec<String>,
    pub passed: bool,
}

impl GameReport {
    fn new(game: GameKind, seed: u64) -> Self {
        Self {
            game,
            seed,
            rounds: 0,
            wagered: 0,
            paid: 0,
            return_to_player: 0.0,
            expected_return: None,
            hits: BTreeMap::new(),
            failures: Vec::new(),
            passed: true,
        }
    }

    fn record(&mut self, label: impl Into<String>, wager: u64, payout: u64) {
        self.rounds += 1;
        self.wagered = self.wagered.saturating_add(wager);
        self.paid = self.paid.saturating_add(payout);
        *self.hits.entry(label.into()).or_default() += 1;
    }

    fn fail(&mut self, failure: String) {
        log::warn!("{} seed {}: {failure}", self.game.key(), self.seed);
        self.failures.push(failure);
    }

    fn check_ledger(&mut self, start: u64, wallet: &Wallet) {
        let expected = start - self.wagered + self.paid;
        if wallet.balance() != expected {
            self.fail(format!(
                "wallet drifted: balance {} but ledger says {expected}",
                wallet.balance()
            ));
        }
    }

    fn finish(mut self) -> Self {
        self.return_to_player = ratio(self.paid, self.wagered);
        self.passed = self.failures.is_empty();
        self
    }
}

pub fn run_game(game: GameKind, plan: &SimulationPlan, seed: u64) -> GameReport {
    match game {
        GameKind::Wheel => run_wheel(plan, seed),
        GameKind::Slots => run_slots(plan, seed),
        GameKind::Roulette => run_roulette(plan, seed),
        GameKind::Plinko => run_plinko(plan, seed),
    }
}

pub fn run_wheel(plan: &SimulationPlan, seed: u64) -> GameReport {
    let mut report = GameReport::new(GameKind::Wheel, seed);
    report.expected_return = Some(plan.table.expected_return());
    let mut session = WheelSession::new(plan.table.clone(), plan.tuning);
    let mut rng = RngBundle::from_user_seed(seed);
    let start = plan.bankroll();
    let mut wallet = Wallet::new(start);

    for spin in 0..plan.spins {
        let (target, required) = match session.start_spin(plan.wager, &mut wallet, rng.wheel()) {
            Ok(state) => (state.target_angle(), state.required_rotations(&plan.tuning)),
            Err(err) => {
                report.fail(format!("spin {spin}: could not start: {err}"));
                break;
            }
        };
        let landed = drive_spin(&mut session, plan.frame_delta(), plan.cancel_after)
            .or_else(|failure| {
                report.fail(format!("spin {spin}: {failure}"));
                session.cancel_spin().ok_or(())
            });
        let Ok(outcome) = landed else {
            continue;
        };
        wallet.credit(outcome.payout);
        report.record(outcome.tier_name.clone(), outcome.wager, outcome.payout);
        if let Err(failure) = check_landing(&plan.table, &outcome, target, required) {
            report.fail(format!("spin {spin}: {failure}"));
        }
        if outcome.payout != payout_for(outcome.wager, outcome.multiplier) {
            report.fail(format!(
                "spin {spin}: paid {} for {} x {}",
                outcome.payout, outcome.wager, outcome.multiplier
            ));
        }
    }

    report.check_ledger(start, &wallet);
    check_tier_rates(&mut report, &plan.table, plan.spins);
    report.finish()
}

/// Step the committed spin until it lands, checking that easing only ever closes in.
fn drive_spin(
    session: &mut WheelSession,
    dt: f64,
    cancel_after: Option<u32>,
) -> Result<SpinOutcome, String> {
    let mut last_remaining: Option<f64> = None;

    for frame in 0..MAX_FRAMES_PER_SPIN {
        let landed = if cancel_after.is_some_and(|limit| frame >= limit) {
            session.cancel_spin()
        } else {
            session.advance(dt)
        };
        if let Some(outcome) = landed {
            return Ok(outcome);
        }
        if let Some(state) = session.spin_state()
            && state.phase() == SpinPhase::Easing
        {
            let remaining = state.remaining_distance();
            if let Some(previous) = last_remaining
                && remaining >= previous
            {
                return Err(format!(
                    "easing stalled at frame {frame}: {remaining:.4}° left after {previous:.4}°"
                ));
            }
            last_remaining = Some(remaining);
        }
    }
    Err(format!("spin did not land within {MAX_FRAMES_PER_SPIN} frames"))
}

fn check_landing(
    table: &WheelTable,
    outcome: &SpinOutcome,
    target: f64,
    required: u32,
) -> Result<(), String> {
    if (outcome.final_angle - target).abs() > ANGLE_TOLERANCE {
        return Err(format!(
            "stopped at {:.4}° instead of target {target:.4}°",
            outcome.final_angle
        ));
    }
    // Easing travel must not count towards the gate.
    match outcome.eased_after_rotations {
        Some(turns) if turns < required => {
            return Err(format!("eased after {turns} turns, {required} required"));
        }
        None if !outcome.cancelled => {
            return Err("landed without passing the rotation gate".to_string());
        }
        _ => {}
    }
    let committed = table
        .tier(outcome.tier_index)
        .ok_or_else(|| format!("committed tier {} missing", outcome.tier_index))?;
    match resolve(outcome.final_angle, table.tiers()) {
        Some(resolution)
            if resolution.exact
                && (resolution.tier_index == outcome.tier_index
                    || committed.contains(outcome.final_angle)) =>
        {
            Ok(())
        }
        Some(resolution) => Err(format!(
            "angle {:.4}° resolves to tier {} but '{}' was committed",
            outcome.final_angle, resolution.tier_index, committed.name
        )),
        None => Err("resolver found no tiers".to_string()),
    }
}

fn check_tier_rates(report: &mut GameReport, table: &WheelTable, spins: u32) {
    if spins < MIN_SPINS_FOR_RATE_CHECK || report.rounds == 0 {
        return;
    }
    let rounds = u64_to_f64(report.rounds);
    for tier in table.tiers() {
        let hits = report.hits.get(&tier.name).copied().unwrap_or(0);
        let observed = ratio(hits, report.rounds);
        let sigma = (tier.probability * (1.0 - tier.probability) / rounds).sqrt();
        let tolerance = RATE_TOLERANCE_SIGMAS * sigma + 1e-3;
        if (observed - tier.probability).abs() > tolerance {
            report.fail(format!(
                "tier '{}' hit {observed:.4} vs configured {:.4} (±{tolerance:.4})",
                tier.name, tier.probability
            ));
        }
    }
}

pub fn run_slots(plan: &SimulationPlan, seed: u64) -> GameReport {
    let mut report = GameReport::new(GameKind::Slots, seed);
    let mut rng = RngBundle::from_user_seed(seed);
    let start = plan.bankroll();
    let mut wallet = Wallet::new(start);
    for round in 0..plan.spins {
        match play_slots(&plan.slots, plan.wager, &mut wallet, rng.slots()) {
            Ok(outcome) => {
                let label = match outcome.matched {
                    SlotsMatch::Triple(_) => "triple",
                    SlotsMatch::Pair(_) => "pair",
                    SlotsMatch::Miss => "miss",
                };
                report.record(label, outcome.wager, outcome.payout);
            }
            Err(err) => {
                report.fail(format!("round {round}: {err}"));
                break;
            }
        }
    }
    report.check_ledger(start, &wallet);
    report.finish()
}

pub fn run_roulette(plan: &SimulationPlan, seed: u64) -> GameReport {
    let mut report = GameReport::new(GameKind::Roulette, seed);
    let mut rng = RngBundle::from_user_seed(seed);
    let start = plan.bankroll();
    let mut wallet = Wallet::new(start);
    for round in 0..plan.spins {
        let ticket = RouletteTicket {
            wager: plan.wager,
            color: [PocketColor::Red, PocketColor::Black, PocketColor::Green]
                [usize::try_from(round % 3).unwrap_or(0)],
            number: u8::try_from(round % 37).unwrap_or(0),
        };
        match play_roulette(&ticket, &mut wallet, rng.roulette()) {
            Ok(outcome) => {
                let label = match outcome.win {
                    RouletteWin::Color => "color",
                    RouletteWin::Number => "number",
                    RouletteWin::Lost => "lost",
                };
                report.record(label, ticket.wager, outcome.payout);
            }
            Err(err) => {
                report.fail(format!("round {round}: {err}"));
                break;
            }
        }
    }
    report.check_ledger(start, &wallet);
    report.finish()
}

pub fn run_plinko(plan: &SimulationPlan, seed: u64) -> GameReport {
    let mut report = GameReport::new(GameKind::Plinko, seed);
    let mut rng = RngBundle::from_user_seed(seed);
    let start = plan.bankroll();
    let mut wallet = Wallet::new(start);
    let bet = PlinkoBet {
        balls: 1,
        eggs_per_ball: plan.wager,
    };
    for round in 0..plan.spins {
        match play_plinko(&plan.plinko, bet, &mut wallet, rng.plinko()) {
            Ok(outcome) => {
                let multiplier = outcome.drops.first().map_or(0.0, |ball| ball.multiplier);
                report.record(format!("{multiplier}x"), outcome.stake, outcome.payout);
            }
            Err(err) => {
                report.fail(format!("round {round}: {err}"));
                break;
            }
        }
    }
    report.check_ledger(start, &wallet);
    report.finish()
}
