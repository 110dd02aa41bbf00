//! Rotation scheduling: which slot fires when.
//!
//! [schedule] replays a fixed window in virtual 50 ms ticks and returns the
//! cast timeline the simulator consumes. [live] drives the same
//! [RotationCore] from a tokio task in real time.

pub mod live;
pub mod rotation;
pub mod state;

use serde::{Deserialize, Serialize};

use crate::config::stats::{CharacterStats, Stat};
use crate::config::{Loadout, RotationPlan, DEFAULT_CAST_DELAY_MS};

pub use rotation::{RechargeClock, RotationCore};
pub use state::ScheduleState;

pub const DEFAULT_TICK_MS: u64 = 50;
/// Encounter window; events at exactly this timestamp are included.
pub const DEFAULT_DURATION_MS: u64 = 61_000;
/// Same-slot firings at most this far apart continue a combo.
pub const COMBO_WINDOW_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastSource {
    Slot(usize),
    /// Auto-attack.
    Basic,
}

impl CastSource {
    pub fn label(&self) -> String {
        match self {
            Self::Slot(slot) => format!("slot{slot}"),
            Self::Basic => "basic".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEvent {
    pub source: CastSource,
    pub timestamp_ms: u64,
    pub combo_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub tick_ms: u64,
    pub duration_ms: u64,
    pub cast_delay_ms: u64,
    pub cooldown_reduction_pct: f64,
    /// Attack speed stat; sets the auto-attack interval.
    pub attack_speed: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            duration_ms: DEFAULT_DURATION_MS,
            cast_delay_ms: DEFAULT_CAST_DELAY_MS,
            cooldown_reduction_pct: 0.0,
            attack_speed: 0.0,
        }
    }
}

impl ScheduleConfig {
    pub fn from_loadout(loadout: &Loadout) -> Self {
        Self {
            cast_delay_ms: loadout.cast_delay_ms,
            cooldown_reduction_pct: loadout.cooldown_reduction,
            attack_speed: loadout.stats[Stat::AttackSpeed],
            ..Self::default()
        }
    }

    /// Offline simulation treats the attack speed stat as the cooldown
    /// reduction, so stat changes move the cast timeline.
    pub fn for_simulation(loadout: &Loadout, stats: &CharacterStats) -> Self {
        Self {
            cast_delay_ms: loadout.cast_delay_ms,
            cooldown_reduction_pct: stats[Stat::AttackSpeed],
            attack_speed: stats[Stat::AttackSpeed],
            ..Self::default()
        }
    }

    /// Milliseconds between auto-attacks.
    pub fn basic_attack_interval_ms(&self) -> f64 {
        (100.0 - self.attack_speed) * 10.0
    }
}

/// Replay the encounter window and return every cast, sorted by timestamp.
/// Skill casts precede auto-attacks that share a timestamp.
pub fn schedule(plan: &RotationPlan, config: &ScheduleConfig) -> Vec<CastEvent> {
    let mut core = RotationCore::new(plan, config, RechargeClock::Polled);
    let mut casts = Vec::new();
    let tick = config.tick_ms.max(1);

    let mut now = 0;
    while now <= config.duration_ms {
        core.step(now, &mut casts);
        now += tick;
    }
    casts.retain(|cast| cast.timestamp_ms <= config.duration_ms);

    let interval = config.basic_attack_interval_ms();
    if interval > 0.0 {
        let mut k = 0u64;
        loop {
            let at = (k as f64 * interval).round() as u64;
            if at > config.duration_ms {
                break;
            }
            casts.push(CastEvent {
                source: CastSource::Basic,
                timestamp_ms: at,
                combo_index: 0,
            });
            k += 1;
        }
    }

    casts.sort_by_key(|cast| cast.timestamp_ms);
    casts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Chain, ChainMember, EquippedAbility};
    use crate::data::ability::{Ability, AbilityId, AbilityLevel, TimedEffect};
    use crate::data::catalog::Catalog;

    fn ability(id: &str, cooldown: f64, max_charges: u32, casting: bool) -> Ability {
        Ability {
            id: AbilityId::from(id),
            name: String::new(),
            cooldown,
            max_charges,
            casting,
            levels: vec![AbilityLevel {
                combos: vec![vec![TimedEffect::damage(0.0, 1.0)]],
            }],
        }
    }

    fn plan_for(
        abilities: Vec<Ability>,
        equipped: Vec<EquippedAbility>,
        chains: Vec<Chain>,
    ) -> RotationPlan {
        let catalog = Catalog::single_job("s", "j", abilities);
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = equipped;
        loadout.chains = chains;
        RotationPlan::resolve(&loadout, &catalog).unwrap()
    }

    fn slot_casts(casts: &[CastEvent], slot: usize) -> Vec<(u64, u32)> {
        casts
            .iter()
            .filter(|c| c.source == CastSource::Slot(slot))
            .map(|c| (c.timestamp_ms, c.combo_index))
            .collect()
    }

    fn short_window() -> ScheduleConfig {
        ScheduleConfig {
            duration_ms: 10_000,
            ..ScheduleConfig::default()
        }
    }

    #[test]
    fn back_to_back_firings_combo_and_recharge_from_first_firing() {
        let plan = plan_for(
            vec![ability("a", 5.0, 2, false)],
            vec![EquippedAbility::new(0, "a")],
            Vec::new(),
        );
        let config = ScheduleConfig {
            cast_delay_ms: 400,
            ..short_window()
        };
        let casts = schedule(&plan, &config);
        let fired = slot_casts(&casts, 0);
        assert_eq!(fired[0], (0, 0));
        assert_eq!(fired[1], (400, 1));
        assert_eq!(fired[2].0, 5000);
    }

    #[test]
    fn firings_outside_window_reset_combo() {
        let plan = plan_for(
            vec![ability("a", 1.5, 3, false)],
            vec![EquippedAbility::new(0, "a")],
            Vec::new(),
        );
        let casts = schedule(&plan, &short_window());
        for pair in slot_casts(&casts, 0).windows(2) {
            let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
            if t1 - t0 > COMBO_WINDOW_MS {
                assert_eq!(c1, 0);
            } else {
                assert!(c1 == c0 + 1 || c1 == 0);
            }
            assert!(c1 <= 2);
        }
    }

    #[test]
    fn casting_ability_on_new_slot_lands_after_delay() {
        let plan = plan_for(
            vec![ability("a", 30.0, 1, true), ability("b", 30.0, 1, false)],
            vec![EquippedAbility::new(0, "a"), EquippedAbility::new(1, "b")],
            Vec::new(),
        );
        let casts = schedule(&plan, &short_window());
        assert_eq!(slot_casts(&casts, 0), vec![(150, 0)]);
        assert_eq!(slot_casts(&casts, 1), vec![(300, 0)]);
    }

    #[test]
    fn priority_orders_initial_casts() {
        let plan = plan_for(
            vec![ability("a", 30.0, 1, false), ability("b", 30.0, 1, false)],
            vec![
                EquippedAbility::new(0, "a"),
                EquippedAbility {
                    priority: Some(1),
                    ..EquippedAbility::new(1, "b")
                },
            ],
            Vec::new(),
        );
        let casts = schedule(&plan, &short_window());
        assert_eq!(slot_casts(&casts, 1), vec![(0, 0)]);
        assert_eq!(slot_casts(&casts, 0), vec![(150, 0)]);
    }

    #[test]
    fn automatic_chain_fires_members_in_order() {
        let plan = plan_for(
            vec![ability("a", 20.0, 2, false), ability("b", 20.0, 1, false)],
            vec![EquippedAbility::new(0, "a"), EquippedAbility::new(1, "b")],
            vec![Chain::automatic(vec![
                ChainMember::new(1, 1),
                ChainMember::new(0, 2),
            ])],
        );
        let casts = schedule(&plan, &short_window());
        let order: Vec<CastSource> = casts
            .iter()
            .filter(|c| c.source != CastSource::Basic)
            .take(3)
            .map(|c| c.source)
            .collect();
        assert_eq!(
            order,
            vec![CastSource::Slot(1), CastSource::Slot(0), CastSource::Slot(0)]
        );
    }

    #[test]
    fn unsatisfiable_and_manual_chains_never_fire() {
        let plan = plan_for(
            vec![ability("a", 2.0, 1, false), ability("b", 2.0, 1, false)],
            vec![EquippedAbility::new(0, "a"), EquippedAbility::new(1, "b")],
            vec![
                Chain::automatic(vec![ChainMember::new(0, 2)]),
                Chain {
                    mode: crate::config::ChainMode::Manual,
                    ..Chain::automatic(vec![ChainMember::new(1, 1)])
                },
            ],
        );
        let casts = schedule(&plan, &short_window());
        assert!(slot_casts(&casts, 0).is_empty());
        assert_eq!(
            slot_casts(&casts, 1).iter().map(|c| c.0).collect::<Vec<_>>(),
            vec![0, 2000, 4000, 6000, 8000, 10_000]
        );
    }

    #[test]
    fn basic_attacks_follow_attack_speed() {
        let plan = plan_for(Vec::new(), Vec::new(), Vec::new());
        let config = ScheduleConfig {
            duration_ms: 3_000,
            attack_speed: 50.0,
            ..ScheduleConfig::default()
        };
        let times: Vec<u64> = schedule(&plan, &config)
            .into_iter()
            .map(|c| c.timestamp_ms)
            .collect();
        assert_eq!(times, vec![0, 500, 1000, 1500, 2000, 2500, 3000]);
    }

    #[test]
    fn skill_casts_precede_basics_at_equal_time() {
        let plan = plan_for(
            vec![ability("a", 30.0, 1, false)],
            vec![EquippedAbility::new(0, "a")],
            Vec::new(),
        );
        let casts = schedule(&plan, &ScheduleConfig::default());
        assert_eq!(casts[0].source, CastSource::Slot(0));
        assert_eq!(casts[1].source, CastSource::Basic);
        assert!(casts.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    }
}
