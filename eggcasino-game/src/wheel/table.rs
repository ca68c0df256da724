//! Prize tiers and the validated section table.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::{FULL_TURN_DEG, WHEEL_PARTITION_TOLERANCE, WHEEL_PROBABILITY_TOLERANCE};

const DEFAULT_WHEEL_DATA: &str = include_str!("../../assets/wheel.json");

/// Compiled-in copy of `assets/wheel.json`, used if the embedded JSON fails to parse.
const BUILTIN_TIERS: [(&str, f64, f64, &[(f64, f64)]); 5] = [
    (
        "1 POINT",
        0.5,
        0.48,
        &[
            (350.0, 4.0),
            (18.0, 32.0),
            (46.0, 60.0),
            (74.0, 89.0),
            (103.0, 118.0),
            (147.0, 161.0),
            (175.0, 190.0),
            (204.0, 220.0),
            (234.0, 249.0),
            (264.0, 279.0),
            (293.0, 309.0),
            (322.0, 337.0),
        ],
    ),
    (
        "3 POINT",
        1.25,
        0.24,
        &[
            (4.0, 18.0),
            (60.0, 74.0),
            (132.0, 147.0),
            (190.0, 204.0),
            (249.0, 264.0),
            (309.0, 322.0),
        ],
    ),
    (
        "5 POINT",
        2.0,
        0.16,
        &[(89.0, 103.0), (118.0, 132.0), (220.0, 234.0), (337.0, 350.0)],
    ),
    ("10 POINT", 5.0, 0.08, &[(32.0, 46.0), (161.0, 175.0)]),
    ("20 POINT", 10.0, 0.04, &[(279.0, 293.0)]),
];

/// Normalize any angle into `[0, 360)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEG);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= FULL_TURN_DEG {
        0.0
    } else {
        wrapped
    }
}

/// Forward (clockwise in wheel terms) distance from `from` to `to`, in `[0, 360)`.
#[must_use]
pub fn forward_distance(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// An arc on the wheel. `start > end` means the arc wraps through 0°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct AngleRange {
    pub start: f64,
    pub end: f64,
}

impl AngleRange {
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Inclusive containment test on a normalized angle.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        if self.wraps() {
            angle >= self.start || angle <= self.end
        } else {
            self.start <= angle && angle <= self.end
        }
    }

    /// Arc length in degrees.
    #[must_use]
    pub fn span(&self) -> f64 {
        if self.wraps() {
            FULL_TURN_DEG - self.start + self.end
        } else {
            self.end - self.start
        }
    }

    /// Shortest angular distance from `angle` to any point of the arc; zero inside it.
    #[must_use]
    pub fn distance_to(&self, angle: f64) -> f64 {
        if self.contains(angle) {
            return 0.0;
        }
        let to_start = forward_distance(angle, self.start);
        let from_end = forward_distance(self.end, angle);
        to_start.min(from_end)
    }

    /// Split a wrapping arc at 0°, yielding one or two non-wrapping segments.
    fn segments(&self) -> impl Iterator<Item = (f64, f64)> {
        let (first, second) = if self.wraps() {
            ((self.start, FULL_TURN_DEG), Some((0.0, self.end)))
        } else {
            ((self.start, self.end), None)
        };
        std::iter::once(first).chain(second)
    }
}

impl From<(f64, f64)> for AngleRange {
    fn from((start, end): (f64, f64)) -> Self {
        Self { start, end }
    }
}

impl From<AngleRange> for (f64, f64) {
    fn from(range: AngleRange) -> Self {
        (range.start, range.end)
    }
}

/// A named prize bucket on the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub name: String,
    pub multiplier: f64,
    #[serde(alias = "odds")]
    pub probability: f64,
    pub ranges: SmallVec<[AngleRange; 4]>,
}

impl PrizeTier {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        multiplier: f64,
        probability: f64,
        ranges: impl IntoIterator<Item = AngleRange>,
    ) -> Self {
        Self {
            name: name.into(),
            multiplier,
            probability,
            ranges: ranges.into_iter().collect(),
        }
    }

    /// Whether any of this tier's arcs contains the normalized angle.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        self.ranges.iter().any(|range| range.contains(angle))
    }

    /// Total arc covered by the tier, in degrees.
    #[must_use]
    pub fn arc_degrees(&self) -> f64 {
        self.ranges.iter().map(AngleRange::span).sum()
    }
}

/// Errors raised when a section table violates the partition invariants.
#[derive(Debug, Error)]
pub enum WheelConfigError {
    #[error("wheel table has no tiers")]
    Empty,
    #[error("tier '{tier}' has no angle ranges")]
    NoRanges { tier: String },
    #[error("tier '{tier}' {field} must be finite and non-negative (got {value})")]
    InvalidWeight {
        tier: String,
        field: &'static str,
        value: f64,
    },
    #[error("tier '{tier}' range ({start}, {end}) lies outside the wheel")]
    RangeOutOfBounds { tier: String, start: f64, end: f64 },
    #[error("tier probabilities sum to {sum:.6}, expected 1.0")]
    ProbabilitySum { sum: f64 },
    #[error("angles {from:.3}..{to:.3} belong to no tier")]
    Gap { from: f64, to: f64 },
    #[error("angle {at:.3} is claimed by more than one range")]
    Overlap { at: f64 },
    #[error("invalid wheel table JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawWheelTable {
    tiers: Vec<PrizeTier>,
}

impl TryFrom<RawWheelTable> for WheelTable {
    type Error = WheelConfigError;

    fn try_from(raw: RawWheelTable) -> Result<Self, Self::Error> {
        Self::new(raw.tiers)
    }
}

/// Ordered, validated prize tiers. Table order is the selection walk order
/// and the resolver's tie-break order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWheelTable")]
pub struct WheelTable {
    tiers: Vec<PrizeTier>,
}

impl WheelTable {
    /// Validate and wrap a tier list.
    ///
    /// # Errors
    ///
    /// Returns a [`WheelConfigError`] when weights are invalid, the
    /// probabilities do not sum to one, or the arcs do not partition the circle.
    pub fn new(tiers: Vec<PrizeTier>) -> Result<Self, WheelConfigError> {
        validate_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    /// Parse and validate a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WheelConfigError::Parse`] for malformed JSON and the
    /// validation variants for well-formed but inconsistent tables.
    pub fn from_json(json: &str) -> Result<Self, WheelConfigError> {
        let raw: RawWheelTable = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    #[must_use]
    pub fn tiers(&self) -> &[PrizeTier] {
        &self.tiers
    }

    #[must_use]
    pub fn tier(&self, index: usize) -> Option<&PrizeTier> {
        self.tiers.get(index)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &PrizeTier)> {
        self.tiers.iter().enumerate().find(|(_, tier)| tier.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Expected payout per egg wagered, before rounding down.
    #[must_use]
    pub fn expected_return(&self) -> f64 {
        self.tiers
            .iter()
            .map(|tier| tier.probability * tier.multiplier)
            .sum()
    }

    fn builtin() -> Self {
        let tiers = BUILTIN_TIERS
            .iter()
            .map(|(name, multiplier, probability, ranges)| {
                PrizeTier::new(
                    *name,
                    *multiplier,
                    *probability,
                    ranges.iter().copied().map(AngleRange::from),
                )
            })
            .collect();
        Self { tiers }
    }
}

impl Default for WheelTable {
    fn default() -> Self {
        Self::from_json(DEFAULT_WHEEL_DATA).unwrap_or_else(|err| {
            log::warn!("embedded wheel table rejected ({err}); using builtin tiers");
            Self::builtin()
        })
    }
}

fn validate_tiers(tiers: &[PrizeTier]) -> Result<(), WheelConfigError> {
    if tiers.is_empty() {
        return Err(WheelConfigError::Empty);
    }

    let mut segments = Vec::new();
    for tier in tiers {
        for (field, value) in [
            ("multiplier", tier.multiplier),
            ("probability", tier.probability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WheelConfigError::InvalidWeight {
                    tier: tier.name.clone(),
                    field,
                    value,
                });
            }
        }
        if tier.ranges.is_empty() {
            return Err(WheelConfigError::NoRanges {
                tier: tier.name.clone(),
            });
        }
        for range in &tier.ranges {
            let start_ok = range.start.is_finite() && (0.0..FULL_TURN_DEG).contains(&range.start);
            let end_ok = range.end.is_finite() && (0.0..=FULL_TURN_DEG).contains(&range.end);
            if !start_ok || !end_ok {
                return Err(WheelConfigError::RangeOutOfBounds {
                    tier: tier.name.clone(),
                    start: range.start,
                    end: range.end,
                });
            }
            segments.extend(range.segments());
        }
    }

    let sum: f64 = tiers.iter().map(|tier| tier.probability).sum();
    if (sum - 1.0).abs() > WHEEL_PROBABILITY_TOLERANCE {
        return Err(WheelConfigError::ProbabilitySum { sum });
    }

    segments.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    let mut covered_to = 0.0_f64;
    for (start, end) in segments {
        if start > covered_to + WHEEL_PARTITION_TOLERANCE {
            return Err(WheelConfigError::Gap {
                from: covered_to,
                to: start,
            });
        }
        if start < covered_to - WHEEL_PARTITION_TOLERANCE {
            return Err(WheelConfigError::Overlap { at: start });
        }
        covered_to = covered_to.max(end);
    }
    if covered_to < FULL_TURN_DEG - WHEEL_PARTITION_TOLERANCE {
        return Err(WheelConfigError::Gap {
            from: covered_to,
            to: FULL_TURN_DEG,
        });
    }
    Ok(())
}
