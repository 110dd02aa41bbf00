//! The four reported power categories.
//!
//! The survivability formula assumes one incoming hit every five seconds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::stats::{CharacterStats, Stat};
use crate::config::SimInfo;

pub const COEF_BOSS_DMG: f64 = 1.0;
pub const COEF_NORMAL_DMG: f64 = 1.3;
pub const COEF_BOSS: f64 = 0.0002;
pub const COEF_NORMAL: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCategory {
    BossDamage = 0,
    NormalDamage = 1,
    /// Survivability against bosses.
    BossPower = 2,
    /// Farming efficiency.
    HuntPower = 3,
}

impl PowerCategory {
    pub const ALL: [PowerCategory; 4] = [
        Self::BossDamage,
        Self::NormalDamage,
        Self::BossPower,
        Self::HuntPower,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BossDamage => "boss_damage",
            Self::NormalDamage => "normal_damage",
            Self::BossPower => "boss_power",
            Self::HuntPower => "hunt_power",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }
}

impl fmt::Display for PowerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per [PowerCategory], indexable by category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Powers(pub [f64; 4]);

impl Powers {
    pub fn get(&self, category: PowerCategory) -> f64 {
        self.0[category.index()]
    }
}

pub fn damage_reduction(stats: &CharacterStats) -> f64 {
    stats[Stat::Defense] * 0.5 + stats[Stat::Vitality] * stats[Stat::Resilience] * 0.001
}

/// Health recovered per second from regeneration and potions.
pub fn recovery(stats: &CharacterStats, sim_info: &SimInfo) -> f64 {
    stats[Stat::Vitality] * 0.1 * 0.2
        + sim_info.potion_heal * (1.0 + stats[Stat::PotionRecovery] * 0.01) * 0.5
}

/// Powers from a boss-run damage total and a normal-run damage total.
///
/// BossPower divides by `1 - evasion / 100`, so it is only meaningful below
/// 100 evasion: it is infinite at 100 and negative past it, and the stat
/// solver cannot bracket across that point.
pub fn powers_from_totals(
    boss_total: f64,
    normal_total: f64,
    stats: &CharacterStats,
    sim_info: &SimInfo,
) -> Powers {
    let reduction = damage_reduction(stats);
    let recovery = recovery(stats, sim_info);
    let boss_damage = boss_total * COEF_BOSS_DMG;
    let normal_damage = normal_total * COEF_NORMAL_DMG;
    let boss_power = boss_damage
        * (stats[Stat::Vitality] + reduction * 5.0 + recovery * 5.0)
        / (1.0 - stats[Stat::Evasion] * 0.01)
        * COEF_BOSS;
    let hunt_power = normal_damage
        * (1.0 + stats[Stat::Luck] * 0.01)
        * (1.0 + stats[Stat::StatusResistance] * 0.001)
        * (1.0 + stats[Stat::ExpGain] * 0.01)
        * COEF_NORMAL;
    Powers([boss_damage, normal_damage, boss_power, hunt_power])
}
