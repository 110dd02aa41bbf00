//! Character stat vector keyed by a closed [Stat] enum.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const STAT_COUNT: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Attack,
    Defense,
    Power,
    Strength,
    Intellect,
    Resilience,
    CritRate,
    CritDamage,
    BossDamage,
    Accuracy,
    Evasion,
    StatusResistance,
    /// Inner-power tier compared against the enemy tier.
    Tier,
    Vitality,
    AttackSpeed,
    PotionRecovery,
    Luck,
    ExpGain,
}

/// Inclusive range a stat value must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatRange {
    pub min: f64,
    pub max: f64,
}

impl StatRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Upper bound of cooldown reduction and of the attack speed stat.
pub const MAX_COOLDOWN_REDUCTION: f64 = 50.0;

impl Stat {
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Attack,
        Stat::Defense,
        Stat::Power,
        Stat::Strength,
        Stat::Intellect,
        Stat::Resilience,
        Stat::CritRate,
        Stat::CritDamage,
        Stat::BossDamage,
        Stat::Accuracy,
        Stat::Evasion,
        Stat::StatusResistance,
        Stat::Tier,
        Stat::Vitality,
        Stat::AttackSpeed,
        Stat::PotionRecovery,
        Stat::Luck,
        Stat::ExpGain,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn range(self) -> StatRange {
        match self {
            Self::Attack
            | Self::Defense
            | Self::Strength
            | Self::Intellect
            | Self::Resilience
            | Self::Vitality => StatRange {
                min: 1.0,
                max: 10_000.0,
            },
            Self::AttackSpeed => StatRange {
                min: 0.0,
                max: MAX_COOLDOWN_REDUCTION,
            },
            Self::Power
            | Self::CritRate
            | Self::CritDamage
            | Self::BossDamage
            | Self::Accuracy
            | Self::Evasion
            | Self::StatusResistance
            | Self::Tier
            | Self::PotionRecovery
            | Self::Luck
            | Self::ExpGain => StatRange {
                min: 0.0,
                max: 10_000.0,
            },
        }
    }

    /// Tier only takes whole values; probes are floored.
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Tier)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Power => "power",
            Self::Strength => "strength",
            Self::Intellect => "intellect",
            Self::Resilience => "resilience",
            Self::CritRate => "crit_rate",
            Self::CritDamage => "crit_damage",
            Self::BossDamage => "boss_damage",
            Self::Accuracy => "accuracy",
            Self::Evasion => "evasion",
            Self::StatusResistance => "status_resistance",
            Self::Tier => "tier",
            Self::Vitality => "vitality",
            Self::AttackSpeed => "attack_speed",
            Self::PotionRecovery => "potion_recovery",
            Self::Luck => "luck",
            Self::ExpGain => "exp_gain",
        }
    }

    pub fn from_name(name: &str) -> Option<Stat> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str() == normalized)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-size stat vector. Serialized as a map keyed by stat name; stats
/// missing from the map take their range minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Stat, f64>", into = "BTreeMap<Stat, f64>")]
pub struct CharacterStats {
    values: [f64; STAT_COUNT],
}

impl Default for CharacterStats {
    fn default() -> Self {
        let mut values = [0.0; STAT_COUNT];
        for stat in Stat::ALL {
            values[stat.index()] = stat.range().min;
        }
        Self { values }
    }
}

impl CharacterStats {
    pub fn get(&self, stat: Stat) -> f64 {
        self.values[stat.index()]
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.values[stat.index()] = value;
    }

    pub fn add(&mut self, stat: Stat, amount: f64) {
        self.values[stat.index()] += amount;
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.set(stat, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        Stat::ALL.into_iter().map(|stat| (stat, self.get(stat)))
    }

    /// First stat outside its allowed range, as a typed error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (stat, value) in self.iter() {
            let range = stat.range();
            if !range.contains(value) {
                return Err(ConfigError::StatOutOfRange {
                    stat,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

impl Index<Stat> for CharacterStats {
    type Output = f64;

    fn index(&self, stat: Stat) -> &f64 {
        &self.values[stat.index()]
    }
}

impl IndexMut<Stat> for CharacterStats {
    fn index_mut(&mut self, stat: Stat) -> &mut f64 {
        &mut self.values[stat.index()]
    }
}

impl From<BTreeMap<Stat, f64>> for CharacterStats {
    fn from(map: BTreeMap<Stat, f64>) -> Self {
        let mut stats = CharacterStats::default();
        for (stat, value) in map {
            stats.set(stat, value);
        }
        stats
    }
}

impl From<CharacterStats> for BTreeMap<Stat, f64> {
    fn from(stats: CharacterStats) -> Self {
        stats.iter().collect()
    }
}
