//! Frame-stepped wheel rotation: constant spin, eased landing, stop.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::selector::WheelDraw;
use super::table::{forward_distance, normalize_angle};
use crate::constants::{
    FULL_TURN_DEG, WHEEL_CLOSE_ROTATIONS, WHEEL_CLOSE_TARGET_DEG, WHEEL_EASE_WINDOW_DEG,
    WHEEL_FAR_ROTATIONS, WHEEL_MAX_FRAME_DELTA_SECS, WHEEL_MIN_EASE_SPEED_DPS,
    WHEEL_SNAP_EPSILON_DEG, WHEEL_SPIN_SPEED_DPS,
};
use crate::numbers::floor_f64_to_u32;

/// Errors raised when spin tuning values cannot produce a terminating spin.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: f64 },
    #[error("close rotations {close} exceed far rotations {far}")]
    RotationOrder { close: u32, far: u32 },
    #[error("snap epsilon {epsilon} must be smaller than the ease window {window}")]
    SnapTooWide { epsilon: f64, window: f64 },
    #[error("one clamped frame turns {travel}° which is not inside the {window}° ease window")]
    FrameOvershoot { travel: f64, window: f64 },
}

/// Speeds, thresholds and rotation gates for the spin animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTuning {
    /// Constant rotation speed before easing, degrees per second.
    #[serde(default = "SpinTuning::default_spin_speed")]
    pub spin_speed_dps: f64,
    /// Arc over which the wheel decelerates onto the target.
    #[serde(default = "SpinTuning::default_ease_window")]
    pub ease_window_deg: f64,
    /// Floor for the eased speed so the wheel never stalls.
    #[serde(default = "SpinTuning::default_min_ease_speed")]
    pub min_ease_speed_dps: f64,
    #[serde(default = "SpinTuning::default_snap_epsilon")]
    pub snap_epsilon_deg: f64,
    /// Targets at most this far ahead of the start angle need fewer turns.
    #[serde(default = "SpinTuning::default_close_target")]
    pub close_target_deg: f64,
    #[serde(default = "SpinTuning::default_close_rotations")]
    pub close_rotations: u32,
    #[serde(default = "SpinTuning::default_far_rotations")]
    pub far_rotations: u32,
    /// Longest frame delta honoured; slower frames are clamped.
    #[serde(default = "SpinTuning::default_max_frame_delta")]
    pub max_frame_delta: f64,
}

impl SpinTuning {
    const fn default_spin_speed() -> f64 {
        WHEEL_SPIN_SPEED_DPS
    }

    const fn default_ease_window() -> f64 {
        WHEEL_EASE_WINDOW_DEG
    }

    const fn default_min_ease_speed() -> f64 {
        WHEEL_MIN_EASE_SPEED_DPS
    }

    const fn default_snap_epsilon() -> f64 {
        WHEEL_SNAP_EPSILON_DEG
    }

    const fn default_close_target() -> f64 {
        WHEEL_CLOSE_TARGET_DEG
    }

    const fn default_close_rotations() -> u32 {
        WHEEL_CLOSE_ROTATIONS
    }

    const fn default_far_rotations() -> u32 {
        WHEEL_FAR_ROTATIONS
    }

    const fn default_max_frame_delta() -> f64 {
        WHEEL_MAX_FRAME_DELTA_SECS
    }

    /// Validate the tuning.
    ///
    /// # Errors
    ///
    /// Returns a [`TuningError`] when a speed, window or frame cap is not
    /// positive, when the close gate needs more turns than the far gate, when
    /// the snap epsilon swallows the whole ease window, or when a single
    /// clamped frame can step over the ease window.
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, value) in [
            ("spin_speed_dps", self.spin_speed_dps),
            ("ease_window_deg", self.ease_window_deg),
            ("min_ease_speed_dps", self.min_ease_speed_dps),
            ("snap_epsilon_deg", self.snap_epsilon_deg),
            ("max_frame_delta", self.max_frame_delta),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::NonPositive { field, value });
            }
        }
        if self.close_rotations > self.far_rotations {
            return Err(TuningError::RotationOrder {
                close: self.close_rotations,
                far: self.far_rotations,
            });
        }
        if self.snap_epsilon_deg >= self.ease_window_deg {
            return Err(TuningError::SnapTooWide {
                epsilon: self.snap_epsilon_deg,
                window: self.ease_window_deg,
            });
        }
        // A frame must travel less than the window or the gate may never open.
        let travel = self.spin_speed_dps * self.max_frame_delta;
        if travel >= self.ease_window_deg {
            return Err(TuningError::FrameOvershoot {
                travel,
                window: self.ease_window_deg,
            });
        }
        Ok(())
    }

    /// Clamp a raw frame delta into `[0, max_frame_delta]`; garbage becomes zero.
    #[must_use]
    pub fn sanitize_delta(&self, dt: f64) -> f64 {
        if !dt.is_finite() || dt <= 0.0 {
            0.0
        } else {
            dt.min(self.max_frame_delta)
        }
    }

    /// Degrees per second while easing with `remaining` degrees to go.
    #[must_use]
    pub fn eased_speed(&self, remaining: f64) -> f64 {
        let progress = 1.0 - remaining / self.ease_window_deg;
        let eased = 1.0 - (1.0 - progress).powi(3);
        (self.spin_speed_dps * (1.0 - eased)).max(self.min_ease_speed_dps)
    }
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            spin_speed_dps: Self::default_spin_speed(),
            ease_window_deg: Self::default_ease_window(),
            min_ease_speed_dps: Self::default_min_ease_speed(),
            snap_epsilon_deg: Self::default_snap_epsilon(),
            close_target_deg: Self::default_close_target(),
            close_rotations: Self::default_close_rotations(),
            far_rotations: Self::default_far_rotations(),
            max_frame_delta: Self::default_max_frame_delta(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpinPhase {
    SpinningConstant,
    Easing,
    Stopped,
}

/// What a single `advance` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStep {
    Spinning,
    /// The frame on which the rotation gate opened.
    BeganEasing,
    Easing,
    /// The wheel reached its target this frame.
    Landed,
    /// Already stopped before this call.
    Idle,
}

/// Animation state for one spin. Created at spin start, discarded once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinState {
    current_angle: f64,
    target_angle: f64,
    start_angle: f64,
    total_rotation: f64,
    phase: SpinPhase,
    started_close_to_target: bool,
    tier_index: usize,
    frames: u32,
    eased_after_rotations: Option<u32>,
}

impl SpinState {
    /// Begin a spin from the wheel's resting angle towards a committed draw.
    #[must_use]
    pub fn begin(resting_angle: f64, draw: WheelDraw, tuning: &SpinTuning) -> Self {
        let start_angle = normalize_angle(resting_angle);
        let target_angle = normalize_angle(draw.angle);
        let diff_from_start = forward_distance(start_angle, target_angle);
        Self {
            current_angle: start_angle,
            target_angle,
            start_angle,
            total_rotation: 0.0,
            phase: SpinPhase::SpinningConstant,
            started_close_to_target: diff_from_start <= tuning.close_target_deg,
            tier_index: draw.tier_index,
            frames: 0,
            eased_after_rotations: None,
        }
    }

    #[must_use]
    pub const fn current_angle(&self) -> f64 {
        self.current_angle
    }

    #[must_use]
    pub const fn target_angle(&self) -> f64 {
        self.target_angle
    }

    #[must_use]
    pub const fn start_angle(&self) -> f64 {
        self.start_angle
    }

    #[must_use]
    pub const fn total_rotation(&self) -> f64 {
        self.total_rotation
    }

    #[must_use]
    pub const fn phase(&self) -> SpinPhase {
        self.phase
    }

    #[must_use]
    pub const fn started_close_to_target(&self) -> bool {
        self.started_close_to_target
    }

    /// Index of the tier committed at spin start.
    #[must_use]
    pub const fn tier_index(&self) -> usize {
        self.tier_index
    }

    /// Number of `advance` calls that moved the wheel.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Full turns completed when the rotation gate opened; `None` until then.
    #[must_use]
    pub const fn eased_after_rotations(&self) -> Option<u32> {
        self.eased_after_rotations
    }

    #[must_use]
    pub fn rotations_completed(&self) -> u32 {
        floor_f64_to_u32(self.total_rotation / FULL_TURN_DEG)
    }

    /// Full turns required before easing may begin.
    #[must_use]
    pub const fn required_rotations(&self, tuning: &SpinTuning) -> u32 {
        if self.started_close_to_target {
            tuning.close_rotations
        } else {
            tuning.far_rotations
        }
    }

    /// Forward distance still to travel to the target, in `[0, 360)`.
    #[must_use]
    pub fn remaining_distance(&self) -> f64 {
        forward_distance(self.current_angle, self.target_angle)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.phase == SpinPhase::Stopped
    }

    /// Step the animation by one rendered frame of `dt` seconds.
    pub fn advance(&mut self, dt: f64, tuning: &SpinTuning) -> SpinStep {
        let dt = tuning.sanitize_delta(dt);
        match self.phase {
            SpinPhase::Stopped => SpinStep::Idle,
            SpinPhase::SpinningConstant => {
                self.frames = self.frames.saturating_add(1);
                let rotation = tuning.spin_speed_dps * dt;
                self.total_rotation += rotation;
                if self.ease_gate_open(tuning) {
                    let rotations = self.rotations_completed();
                    log::debug!(
                        "wheel easing after {rotations} rotations, {:.1}° from target",
                        self.remaining_distance()
                    );
                    self.eased_after_rotations = Some(rotations);
                    self.phase = SpinPhase::Easing;
                    match self.ease_step(dt, tuning) {
                        SpinStep::Landed => SpinStep::Landed,
                        _ => SpinStep::BeganEasing,
                    }
                } else {
                    self.current_angle = normalize_angle(self.current_angle + rotation);
                    SpinStep::Spinning
                }
            }
            SpinPhase::Easing => {
                self.frames = self.frames.saturating_add(1);
                self.ease_step(dt, tuning)
            }
        }
    }

    /// Jump straight to the committed target, whatever the phase.
    pub fn snap_to_target(&mut self) {
        self.current_angle = self.target_angle;
        self.phase = SpinPhase::Stopped;
    }

    fn ease_gate_open(&self, tuning: &SpinTuning) -> bool {
        self.rotations_completed() >= self.required_rotations(tuning)
            && self.remaining_distance() <= tuning.ease_window_deg
    }

    fn ease_step(&mut self, dt: f64, tuning: &SpinTuning) -> SpinStep {
        let remaining = self.remaining_distance();
        if remaining < tuning.snap_epsilon_deg
            || remaining > FULL_TURN_DEG - tuning.snap_epsilon_deg
        {
            self.snap_to_target();
            return SpinStep::Landed;
        }

        let step = tuning.eased_speed(remaining) * dt;
        if step >= remaining {
            self.total_rotation += remaining;
            self.snap_to_target();
            return SpinStep::Landed;
        }
        self.current_angle = normalize_angle(self.current_angle + step);
        self.total_rotation += step;
        SpinStep::Easing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn draw_at(angle: f64) -> WheelDraw {
        WheelDraw {
            tier_index: 0,
            angle,
            roll: 0.0,
        }
    }

    fn run_to_rest(state: &mut SpinState, tuning: &SpinTuning) -> u32 {
        for frame in 1..=10_000 {
            if state.advance(FRAME, tuning) == SpinStep::Landed {
                return frame;
            }
        }
        panic!("spin never landed: {state:?}");
    }

    #[test]
    fn default_tuning_is_valid() {
        let tuning = SpinTuning::default();
        assert_eq!(tuning.validate(), Ok(()));
        let parsed: SpinTuning = serde_json::from_str(r#"{"far_rotations": 4}"#).unwrap();
        assert_eq!(parsed.far_rotations, 4);
        assert!((parsed.spin_speed_dps - 360.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tuning_validation_rejects_nonsense() {
        let zero_speed = SpinTuning {
            min_ease_speed_dps: 0.0,
            ..SpinTuning::default()
        };
        assert_eq!(
            zero_speed.validate(),
            Err(TuningError::NonPositive {
                field: "min_ease_speed_dps",
                value: 0.0
            })
        );
        let inverted = SpinTuning {
            close_rotations: 5,
            ..SpinTuning::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(TuningError::RotationOrder { close: 5, far: 3 })
        );
        let wide = SpinTuning {
            snap_epsilon_deg: 200.0,
            ..SpinTuning::default()
        };
        assert!(matches!(
            wide.validate(),
            Err(TuningError::SnapTooWide { .. })
        ));
    }

    #[test]
    fn tuning_rejects_frames_that_cover_the_ease_window() {
        let fast = SpinTuning {
            spin_speed_dps: 1440.0,
            ..SpinTuning::default()
        };
        assert_eq!(
            fast.validate(),
            Err(TuningError::FrameOvershoot {
                travel: 360.0,
                window: 120.0
            })
        );
        let exact = SpinTuning {
            spin_speed_dps: 480.0,
            ..SpinTuning::default()
        };
        assert!(matches!(
            exact.validate(),
            Err(TuningError::FrameOvershoot { .. })
        ));
        let short_frames = SpinTuning {
            spin_speed_dps: 1440.0,
            max_frame_delta: 0.05,
            ..SpinTuning::default()
        };
        assert_eq!(short_frames.validate(), Ok(()));

        let mut state = SpinState::begin(0.0, draw_at(200.0), &short_frames);
        let mut landed = false;
        for _ in 0..10_000 {
            if state.advance(0.25, &short_frames) == SpinStep::Landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!((state.current_angle() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eased_speed_decays_to_floor() {
        let tuning = SpinTuning::default();
        assert!((tuning.eased_speed(120.0) - 360.0).abs() < 1e-9);
        assert!((tuning.eased_speed(60.0) - 45.0).abs() < 1e-9);
        assert!((tuning.eased_speed(1.0) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn frame_delta_is_sanitized() {
        let tuning = SpinTuning::default();
        assert!(tuning.sanitize_delta(f64::NAN).abs() < f64::EPSILON);
        assert!(tuning.sanitize_delta(-1.0).abs() < f64::EPSILON);
        assert!((tuning.sanitize_delta(3.0) - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn close_target_lands_after_two_turns() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(0.0, draw_at(90.0), &tuning);
        assert!(state.started_close_to_target());
        assert_eq!(state.required_rotations(&tuning), 2);
        run_to_rest(&mut state, &tuning);
        assert!(state.is_stopped());
        assert!((state.current_angle() - 90.0).abs() < f64::EPSILON);
        assert!(state.total_rotation() >= 720.0);
    }

    #[test]
    fn far_target_requires_three_turns() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(10.0, draw_at(300.0), &tuning);
        assert!(!state.started_close_to_target());
        let mut entered_at = None;
        for _ in 0..10_000 {
            match state.advance(FRAME, &tuning) {
                SpinStep::BeganEasing => entered_at = Some(state.total_rotation()),
                SpinStep::Landed => break,
                _ => {}
            }
        }
        let entered_at = entered_at.expect("easing phase reached");
        assert!(entered_at >= 1080.0, "eased after {entered_at}°");
        assert_eq!(state.eased_after_rotations(), Some(3));
        assert!((state.current_angle() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn target_on_start_angle_wraps_cleanly() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(359.95, draw_at(0.02), &tuning);
        run_to_rest(&mut state, &tuning);
        assert!((state.current_angle() - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_frame_gaps_cannot_skip_the_ease_window() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(0.0, draw_at(200.0), &tuning);
        let mut landed = false;
        for _ in 0..1_000 {
            if state.advance(5.0, &tuning) == SpinStep::Landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
    }

    #[test]
    fn snap_stops_from_any_phase() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(0.0, draw_at(42.0), &tuning);
        state.advance(FRAME, &tuning);
        state.snap_to_target();
        assert_eq!(state.phase(), SpinPhase::Stopped);
        assert!((state.current_angle() - 42.0).abs() < f64::EPSILON);
        assert_eq!(state.advance(FRAME, &tuning), SpinStep::Idle);
    }

    #[test]
    fn zero_delta_leaves_the_wheel_in_place() {
        let tuning = SpinTuning::default();
        let mut state = SpinState::begin(15.0, draw_at(200.0), &tuning);
        assert_eq!(state.advance(0.0, &tuning), SpinStep::Spinning);
        assert!((state.current_angle() - 15.0).abs() < f64::EPSILON);
    }
}
