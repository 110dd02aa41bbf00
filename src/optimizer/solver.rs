//! Inverse search: how much of one stat a power target needs.
//!
//! Powers are monotone non-decreasing in the offensive and defensive stats
//! under the deterministic evaluator, so an exponential bracket followed by
//! bisection finds the smallest delta to within the tolerance below.

use serde::Serialize;

use crate::combat::engine::round_to;
use crate::combat::power::PowerCategory;
use crate::config::stats::{CharacterStats, Stat};
use crate::optimizer::model::PowerModel;

/// Bracket probes at 1, 2, 4, .. 512 above base; a target past the last
/// one is unsatisfiable.
const MAX_BRACKET_PROBES: u32 = 10;
const MAX_BISECTION_STEPS: u32 = 15;
const TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "delta")]
pub enum SolveOutcome {
    /// Stat increase needed, rounded to 0.1.
    Required(f64),
    Unsatisfiable,
}

impl SolveOutcome {
    pub fn delta(self) -> Option<f64> {
        match self {
            Self::Required(delta) => Some(delta),
            Self::Unsatisfiable => None,
        }
    }
}

fn probe(model: &PowerModel<'_>, stat: Stat, value: f64, category: PowerCategory) -> f64 {
    let value = if stat.is_integral() { value.floor() } else { value };
    let stats: CharacterStats = model.base_stats().with(stat, value);
    model.powers(&stats).get(category)
}

pub fn required_delta(
    model: &PowerModel<'_>,
    stat: Stat,
    target: f64,
    category: PowerCategory,
) -> SolveOutcome {
    let range = stat.range();
    let base = model.base_stats()[stat];
    if !range.contains(base) {
        return SolveOutcome::Unsatisfiable;
    }

    let mut low = 0.0;
    let mut high = 1.0;
    let mut step = 1.0;
    if probe(model, stat, base, category) < target {
        let mut probes = 0;
        loop {
            if !range.contains(base + low) {
                return SolveOutcome::Unsatisfiable;
            }
            if probe(model, stat, base + high, category) >= target {
                break;
            }
            probes += 1;
            if probes >= MAX_BRACKET_PROBES {
                return SolveOutcome::Unsatisfiable;
            }
            low = high;
            high += step;
            step *= 2.0;
        }
    } else {
        high = 0.0;
    }

    let mut steps = 0;
    while high - low > TOLERANCE && steps < MAX_BISECTION_STEPS {
        if !range.contains(base + low) {
            return SolveOutcome::Unsatisfiable;
        }
        let mid = (low + high) / 2.0;
        if probe(model, stat, base + mid, category) < target {
            low = mid;
        } else {
            high = mid;
        }
        steps += 1;
    }

    SolveOutcome::Required(round_to((low + high) / 2.0, 1))
}

/// Solve every category for the targets given in category order.
pub fn required_deltas(
    model: &PowerModel<'_>,
    stat: Stat,
    targets: &[f64; 4],
) -> [SolveOutcome; 4] {
    PowerCategory::ALL.map(|category| required_delta(model, stat, targets[category.index()], category))
}
