//! Ability records: cooldown, combo charges and per-level attack timelines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::stats::Stat;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl AbilityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What happens at one instant of an ability's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Hit for `multiplier` times the base damage.
    Damage { multiplier: f64 },
    /// Add `amount` to `stat` for `duration` seconds.
    Buff {
        stat: Stat,
        amount: f64,
        duration: f64,
    },
    /// Carried in data, not simulated.
    Heal { amount: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Seconds after the cast.
    pub offset: f64,
    #[serde(flatten)]
    pub effect: Effect,
}

impl TimedEffect {
    pub fn damage(offset: f64, multiplier: f64) -> Self {
        Self {
            offset,
            effect: Effect::Damage { multiplier },
        }
    }

    pub fn buff(offset: f64, stat: Stat, amount: f64, duration: f64) -> Self {
        Self {
            offset,
            effect: Effect::Buff {
                stat,
                amount,
                duration,
            },
        }
    }
}

/// One level of an ability: a timeline per combo index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AbilityLevel {
    pub combos: Vec<Vec<TimedEffect>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    #[serde(default)]
    pub name: String,
    /// Base cooldown in seconds, before cooldown reduction.
    pub cooldown: f64,
    /// Charges the ability stacks; also the length of its combo chain.
    pub max_charges: u32,
    /// Needs a confirm click after the slot is selected.
    #[serde(default)]
    pub casting: bool,
    #[serde(default)]
    pub levels: Vec<AbilityLevel>,
}

impl Ability {
    /// Highest combo index a firing can be tagged with.
    pub fn max_combo_index(&self) -> u32 {
        self.max_charges.saturating_sub(1)
    }

    /// Cooldown in milliseconds after applying `reduction_pct` percent reduction.
    pub fn effective_cooldown_ms(&self, reduction_pct: f64) -> u64 {
        (self.cooldown * 1000.0 * (100.0 - reduction_pct) / 100.0)
            .round()
            .max(0.0) as u64
    }

    pub fn has_level(&self, level: usize) -> bool {
        level < self.levels.len()
    }

    /// Timeline for one firing. Combo indices past the recorded ones reuse the
    /// last recorded timeline.
    pub fn timeline(&self, level: usize, combo: u32) -> &[TimedEffect] {
        let Some(level) = self.levels.get(level) else {
            return &[];
        };
        let index = (combo as usize).min(level.combos.len().saturating_sub(1));
        level.combos.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ability {
        Ability {
            id: AbilityId::from("slash"),
            name: "Slash".to_string(),
            cooldown: 8.0,
            max_charges: 3,
            casting: false,
            levels: vec![AbilityLevel {
                combos: vec![
                    vec![TimedEffect::damage(0.0, 1.0)],
                    vec![TimedEffect::damage(0.0, 1.5)],
                ],
            }],
        }
    }

    #[test]
    fn effective_cooldown_applies_reduction() {
        let ability = sample();
        assert_eq!(ability.effective_cooldown_ms(0.0), 8000);
        assert_eq!(ability.effective_cooldown_ms(25.0), 6000);
    }

    #[test]
    fn timeline_clamps_combo_index_to_recorded_timelines() {
        let ability = sample();
        assert_eq!(ability.timeline(0, 2), ability.timeline(0, 1));
        assert!(ability.timeline(3, 0).is_empty());
    }

    #[test]
    fn effects_parse_from_tagged_yaml() {
        let raw = "- { offset: 0.2, type: damage, multiplier: 0.5 }\n- { offset: 0.0, type: buff, stat: crit_rate, amount: 10, duration: 5 }\n";
        let effects: Vec<TimedEffect> = serde_yaml::from_str(raw).unwrap();
        assert_eq!(effects[0], TimedEffect::damage(0.2, 0.5));
        assert_eq!(effects[1], TimedEffect::buff(0.0, Stat::CritRate, 10.0, 5.0));
    }
}
