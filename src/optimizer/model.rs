//! Stats in, powers out: the schedule-then-simulate pipeline behind both the
//! Monte Carlo runner and the stat solver.

use crate::combat::engine::{total_damage, AttackEvent, Encounter, Roll, Target};
use crate::combat::power::{powers_from_totals, Powers};
use crate::config::stats::CharacterStats;
use crate::config::{Loadout, RotationPlan, SimInfo};
use crate::scheduler::{schedule, ScheduleConfig};

/// Deterministic result of one pass over an encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub powers: Powers,
    pub boss_attacks: Vec<AttackEvent>,
    pub normal_attacks: Vec<AttackEvent>,
}

#[derive(Debug, Clone, Copy)]
pub struct PowerModel<'a> {
    plan: &'a RotationPlan,
    loadout: &'a Loadout,
}

impl<'a> PowerModel<'a> {
    pub fn new(plan: &'a RotationPlan, loadout: &'a Loadout) -> Self {
        Self { plan, loadout }
    }

    pub fn base_stats(&self) -> &CharacterStats {
        &self.loadout.stats
    }

    pub fn sim_info(&self) -> &SimInfo {
        &self.loadout.sim_info
    }

    /// Attack speed feeds the schedule, so the encounter depends on `stats`.
    pub fn encounter(&self, stats: &CharacterStats) -> Encounter {
        let config = ScheduleConfig::for_simulation(self.loadout, stats);
        Encounter::from_timeline(&schedule(self.plan, &config), self.plan)
    }

    pub fn evaluate_encounter(&self, encounter: &Encounter, stats: &CharacterStats) -> Evaluation {
        let sim_info = self.sim_info();
        let boss_attacks = encounter.run(stats, sim_info, Target::Boss, Roll::Expected);
        let normal_attacks = encounter.run(stats, sim_info, Target::Normal, Roll::Expected);
        let powers = powers_from_totals(
            total_damage(&boss_attacks),
            total_damage(&normal_attacks),
            stats,
            sim_info,
        );
        Evaluation {
            powers,
            boss_attacks,
            normal_attacks,
        }
    }

    pub fn evaluate(&self, stats: &CharacterStats) -> Evaluation {
        self.evaluate_encounter(&self.encounter(stats), stats)
    }

    pub fn powers(&self, stats: &CharacterStats) -> Powers {
        self.evaluate(stats).powers
    }
}
