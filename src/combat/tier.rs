//! Damage multiplier from the tier gap between target and attacker.

/// `(lowest difference, multiplier)` rows, highest difference first. A
/// difference matches the first row whose bound it reaches.
const TIER_TABLE: [(i64, f64); 16] = [
    (6, 0.0),
    (5, 0.3),
    (4, 0.5),
    (3, 0.7),
    (2, 0.85),
    (1, 0.95),
    (0, 1.0),
    (-1, 1.025),
    (-2, 1.05),
    (-4, 1.075),
    (-6, 1.1),
    (-9, 1.15),
    (-13, 1.2),
    (-18, 1.3),
    (-25, 1.4),
    (i64::MIN, 1.5),
];

/// Multiplier for `target_tier - attacker_tier`. Out-of-table gaps clamp to
/// the end rows.
pub fn tier_multiplier(difference: i64) -> f64 {
    TIER_TABLE
        .iter()
        .find(|(bound, _)| difference >= *bound)
        .map_or(1.5, |(_, multiplier)| *multiplier)
}

/// Tiers are whole numbers; fractional stat values are floored.
pub fn tier_difference(target_tier: f64, attacker_tier: f64) -> i64 {
    target_tier.floor() as i64 - attacker_tier.floor() as i64
}
