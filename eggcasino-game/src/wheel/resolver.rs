use super::table::{PrizeTier, normalize_angle};

/// Which tier a stopping angle falls in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub tier_index: usize,
    /// `false` when no arc contained the angle and the nearest tier was used.
    pub exact: bool,
}

/// Look up the tier whose arc contains `angle`, scanning in table order.
///
/// Ties on shared endpoints go to the earlier tier. An angle that no arc
/// contains (only possible for an unvalidated tier list) resolves to the
/// nearest tier by angular distance instead of failing. Returns `None` only
/// for an empty tier list.
#[must_use]
pub fn resolve(angle: f64, tiers: &[PrizeTier]) -> Option<Resolution> {
    let angle = normalize_angle(angle);
    if let Some(tier_index) = tiers.iter().position(|tier| tier.contains(angle)) {
        return Some(Resolution {
            tier_index,
            exact: true,
        });
    }

    let tier_index = nearest_tier(angle, tiers)?;
    log::warn!(
        "wheel angle {angle:.3} matched no tier; falling back to nearest tier '{}'",
        tiers[tier_index].name
    );
    Some(Resolution {
        tier_index,
        exact: false,
    })
}

fn nearest_tier(angle: f64, tiers: &[PrizeTier]) -> Option<usize> {
    tiers
        .iter()
        .enumerate()
        .filter_map(|(index, tier)| {
            tier.ranges
                .iter()
                .map(|range| range.distance_to(angle))
                .min_by(f64::total_cmp)
                .map(|distance| (index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
