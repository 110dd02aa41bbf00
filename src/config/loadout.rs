//! The loadout: everything a caller configures for one character preset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::chain::{Chain, ChainMode};
use crate::config::stats::{CharacterStats, MAX_COOLDOWN_REDUCTION};
use crate::config::{DEFAULT_CAST_DELAY_MS, MAX_CAST_DELAY_MS, MIN_CAST_DELAY_MS, SLOT_COUNT};
use crate::data::ability::{Ability, AbilityId};
use crate::data::catalog::Catalog;
use crate::data::loader::read_data_file;
use crate::error::{ConfigError, LoadError};

fn default_true() -> bool {
    true
}

fn default_level() -> usize {
    1
}

fn default_combo_repeat() -> u32 {
    1
}

fn default_cast_delay() -> u64 {
    DEFAULT_CAST_DELAY_MS
}

/// An ability bound to one of the six slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquippedAbility {
    pub slot: usize,
    pub ability: AbilityId,
    /// 1-based ability level.
    #[serde(default = "default_level")]
    pub level: usize,
    /// Fired automatically when ready.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// May fire outside its chain.
    #[serde(default)]
    pub solo_usable: bool,
    /// Casts per opportunity, 1..=max charges.
    #[serde(default = "default_combo_repeat")]
    pub combo_repeat: u32,
    /// Unique rank 1..=6, lower fires first.
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub hotkey: Option<String>,
}

impl EquippedAbility {
    pub fn new(slot: usize, ability: &str) -> Self {
        Self {
            slot,
            ability: AbilityId::from(ability),
            level: 1,
            enabled: true,
            solo_usable: false,
            combo_repeat: 1,
            priority: None,
            hotkey: None,
        }
    }
}

/// Enemy tiers and potion baseline used by the damage and power formulas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimInfo {
    #[serde(default)]
    pub normal_tier: f64,
    #[serde(default)]
    pub boss_tier: f64,
    #[serde(default)]
    pub potion_heal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub server: String,
    pub job: String,
    /// Percent, 0..=50.
    #[serde(default)]
    pub cooldown_reduction: f64,
    #[serde(default = "default_cast_delay")]
    pub cast_delay_ms: u64,
    #[serde(default)]
    pub equipped: Vec<EquippedAbility>,
    #[serde(default)]
    pub chains: Vec<Chain>,
    #[serde(default)]
    pub stats: CharacterStats,
    #[serde(default)]
    pub sim_info: SimInfo,
}

impl Loadout {
    pub fn new(server: &str, job: &str) -> Self {
        Self {
            server: server.to_string(),
            job: job.to_string(),
            cooldown_reduction: 0.0,
            cast_delay_ms: DEFAULT_CAST_DELAY_MS,
            equipped: Vec::new(),
            chains: Vec::new(),
            stats: CharacterStats::default(),
            sim_info: SimInfo::default(),
        }
    }

    /// Read a loadout from YAML or JSON. The result is not validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(read_data_file(path)?)
    }

    pub fn slot(&self, slot: usize) -> Option<&EquippedAbility> {
        self.equipped.iter().find(|equip| equip.slot == slot)
    }

    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut EquippedAbility> {
        self.equipped.iter_mut().find(|equip| equip.slot == slot)
    }

    /// Catalog entry behind an equipped slot.
    pub fn ability_in<'a>(&self, catalog: &'a Catalog, slot: usize) -> Option<&'a Ability> {
        let equip = self.slot(slot)?;
        catalog.ability(&self.server, &self.job, equip.ability.as_str())
    }

    /// Index of the automatic chain reserving `slot`, if any.
    pub fn automatic_chain_of(&self, slot: usize) -> Option<usize> {
        self.chains.iter().position(|chain| {
            chain.mode == ChainMode::Automatic && chain.members.iter().any(|m| m.slot == slot)
        })
    }

    /// Check the whole loadout and return the first error.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        match config_errors(self, catalog).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Every hard error in a loadout, in a stable order.
pub(crate) fn config_errors(loadout: &Loadout, catalog: &Catalog) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !(0.0..=MAX_COOLDOWN_REDUCTION).contains(&loadout.cooldown_reduction) {
        errors.push(ConfigError::CooldownReductionOutOfRange(
            loadout.cooldown_reduction,
        ));
    }
    if !(MIN_CAST_DELAY_MS..=MAX_CAST_DELAY_MS).contains(&loadout.cast_delay_ms) {
        errors.push(ConfigError::CastDelayOutOfRange(loadout.cast_delay_ms));
    }
    if let Err(err) = loadout.stats.validate() {
        errors.push(err);
    }

    let mut seen_slots: [bool; SLOT_COUNT] = [false; SLOT_COUNT];
    let mut priorities: [Option<usize>; SLOT_COUNT] = [None; SLOT_COUNT];
    for (index, equip) in loadout.equipped.iter().enumerate() {
        if equip.slot >= SLOT_COUNT {
            errors.push(ConfigError::SlotOutOfRange(equip.slot));
            continue;
        }
        if seen_slots[equip.slot] {
            errors.push(ConfigError::SlotTaken(equip.slot));
            continue;
        }
        seen_slots[equip.slot] = true;

        if let Some(earlier) = loadout.equipped[..index]
            .iter()
            .find(|other| other.ability == equip.ability)
        {
            errors.push(ConfigError::DuplicateEquip {
                ability: equip.ability.to_string(),
                first: earlier.slot,
                second: equip.slot,
            });
        }

        match catalog.ability(&loadout.server, &loadout.job, equip.ability.as_str()) {
            None => errors.push(ConfigError::UnknownAbility {
                server: loadout.server.clone(),
                job: loadout.job.clone(),
                ability: equip.ability.to_string(),
            }),
            Some(ability) => {
                if equip.level == 0 || !ability.has_level(equip.level - 1) {
                    errors.push(ConfigError::UnknownLevel {
                        ability: equip.ability.to_string(),
                        level: equip.level,
                    });
                }
                if equip.combo_repeat == 0 || equip.combo_repeat > ability.max_charges {
                    errors.push(ConfigError::ComboRepeatOutOfRange {
                        slot: equip.slot,
                        value: equip.combo_repeat,
                        max: ability.max_charges,
                    });
                }
            }
        }

        if let Some(priority) = equip.priority {
            if priority == 0 || priority as usize > SLOT_COUNT {
                errors.push(ConfigError::PriorityOutOfRange { priority });
            } else if let Some(first) = priorities[priority as usize - 1] {
                errors.push(ConfigError::DuplicatePriority {
                    priority,
                    first,
                    second: equip.slot,
                });
            } else {
                priorities[priority as usize - 1] = Some(equip.slot);
            }
        }
    }

    let mut reserved: [Option<usize>; SLOT_COUNT] = [None; SLOT_COUNT];
    for (index, chain) in loadout.chains.iter().enumerate() {
        errors.extend(chain_shape_errors(loadout, index, chain));
        if chain.mode != ChainMode::Automatic {
            continue;
        }
        for slot in chain.slots() {
            if slot >= SLOT_COUNT {
                continue;
            }
            match reserved[slot] {
                Some(first) if first != index => errors.push(ConfigError::SharedChainSlot {
                    slot,
                    first,
                    second: index,
                }),
                _ => reserved[slot] = Some(index),
            }
        }
    }

    errors
}

/// Errors local to one chain: empty, unequipped member slots, zero counts.
pub(crate) fn chain_shape_errors(loadout: &Loadout, index: usize, chain: &Chain) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if chain.members.is_empty() {
        errors.push(ConfigError::EmptyChain { chain: index });
    }
    for member in &chain.members {
        if member.slot >= SLOT_COUNT {
            errors.push(ConfigError::SlotOutOfRange(member.slot));
        } else if loadout.slot(member.slot).is_none() {
            errors.push(ConfigError::ChainSlotEmpty {
                chain: index,
                slot: member.slot,
            });
        }
        if member.count == 0 {
            errors.push(ConfigError::ZeroChainCount {
                chain: index,
                slot: member.slot,
            });
        }
    }
    errors
}
