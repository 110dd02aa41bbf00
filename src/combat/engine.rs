//! Encounter expansion and per-hit damage.
//!
//! A cast timeline becomes dated hits plus merged buff intervals; each hit is
//! then priced against the stats in effect at its timestamp. Hit times round
//! to 2 places and per-hit damage to 5.

use serde::{Deserialize, Serialize};

use crate::combat::buffs::{merge_buffs, stats_at, BuffInterval};
use crate::combat::rng::Rng;
use crate::combat::tier::{tier_difference, tier_multiplier};
use crate::config::stats::{CharacterStats, Stat};
use crate::config::{RotationPlan, SimInfo};
use crate::data::ability::Effect;
use crate::scheduler::{CastEvent, CastSource};

/// Final scaling constant of the base damage formula.
pub const DAMAGE_SCALE: f64 = 0.01;
/// Midpoint of the damage variance range, used by the expected-value pass.
pub const EXPECTED_VARIANCE: f64 = 1.1;
pub const VARIANCE_RANGE: (f64, f64) = (1.0, 1.2);
/// Crit chance is capped at 100% in the expected-value pass only.
pub const EXPECTED_CRIT_CAP: f64 = 100.0;
pub const BASIC_ATTACK_MULTIPLIER: f64 = 1.0;

pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub source: CastSource,
    /// Seconds, rounded to 2 places.
    pub time: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Boss,
    Normal,
}

/// How the damage variance and crit roll are resolved.
pub enum Roll<'r> {
    /// Expected value: no randomness, monotone in every stat.
    Expected,
    Sampled(&'r mut Rng),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    pub source: CastSource,
    /// Seconds.
    pub time: f64,
    pub damage: f64,
}

/// Dated hits and merged buffs for one cast timeline. Independent of stats,
/// so one encounter serves every pass over the same timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Encounter {
    pub hits: Vec<Hit>,
    pub buffs: Vec<BuffInterval>,
}

impl Encounter {
    pub fn from_timeline(timeline: &[CastEvent], plan: &RotationPlan) -> Self {
        let mut hits = Vec::new();
        let mut raw_buffs = Vec::new();

        for cast in timeline {
            let cast_time = round_to(cast.timestamp_ms as f64 * 0.001, 2);
            let slot = match cast.source {
                CastSource::Basic => {
                    hits.push(Hit {
                        source: CastSource::Basic,
                        time: cast_time,
                        multiplier: BASIC_ATTACK_MULTIPLIER,
                    });
                    continue;
                }
                CastSource::Slot(slot) => slot,
            };
            let Some(planned) = plan.slot(slot) else {
                continue;
            };
            let timeline = planned.ability.timeline(planned.level_index, cast.combo_index);
            for timed in timeline {
                let time = round_to(cast_time + timed.offset, 2);
                match timed.effect {
                    Effect::Damage { multiplier } => hits.push(Hit {
                        source: cast.source,
                        time,
                        multiplier,
                    }),
                    Effect::Buff {
                        stat,
                        amount,
                        duration,
                    } => raw_buffs.push(BuffInterval {
                        stat,
                        amount,
                        start: time,
                        end: round_to(time + duration, 2),
                    }),
                    Effect::Heal { .. } => {}
                }
            }
        }

        hits.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            hits,
            buffs: merge_buffs(&raw_buffs),
        }
    }

    /// Price every hit against `stats` for one target.
    pub fn run(
        &self,
        stats: &CharacterStats,
        sim_info: &SimInfo,
        target: Target,
        mut roll: Roll<'_>,
    ) -> Vec<AttackEvent> {
        self.hits
            .iter()
            .map(|hit| {
                let effective = stats_at(stats, &self.buffs, hit.time);
                let value = match &mut roll {
                    Roll::Expected => expected_damage(&effective, sim_info, target),
                    Roll::Sampled(rng) => sampled_damage(&effective, sim_info, target, rng),
                };
                AttackEvent {
                    source: hit.source,
                    time: hit.time,
                    damage: round_to(value * hit.multiplier, 5),
                }
            })
            .collect()
    }
}

/// Damage before variance and crits.
pub fn base_damage(stats: &CharacterStats, sim_info: &SimInfo, target: Target) -> f64 {
    let target_tier = match target {
        Target::Boss => sim_info.boss_tier,
        Target::Normal => sim_info.normal_tier,
    };
    let boss_bonus = match target {
        Target::Boss => 1.0 + stats[Stat::BossDamage] * 0.01,
        Target::Normal => 1.0,
    };
    stats[Stat::Attack]
        * (stats[Stat::Strength] + stats[Stat::Intellect])
        * (1.0 + stats[Stat::Power] * 0.01)
        * tier_multiplier(tier_difference(target_tier, stats[Stat::Tier]))
        * boss_bonus
        * DAMAGE_SCALE
}

pub fn expected_damage(stats: &CharacterStats, sim_info: &SimInfo, target: Target) -> f64 {
    let crit = stats[Stat::CritRate].min(EXPECTED_CRIT_CAP);
    base_damage(stats, sim_info, target)
        * (1.0 + crit * stats[Stat::CritDamage] * 1e-4)
        * EXPECTED_VARIANCE
}

pub fn sampled_damage(
    stats: &CharacterStats,
    sim_info: &SimInfo,
    target: Target,
    rng: &mut Rng,
) -> f64 {
    let (low, high) = VARIANCE_RANGE;
    let damage = base_damage(stats, sim_info, target) * rng.uniform(low, high);
    if rng.chance(stats[Stat::CritRate] * 0.01) {
        damage * (1.0 + stats[Stat::CritDamage] * 0.01)
    } else {
        damage
    }
}

pub fn total_damage(events: &[AttackEvent]) -> f64 {
    events.iter().map(|e| e.damage).sum()
}
