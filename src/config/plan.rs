//! A loadout resolved against the catalog, ready for scheduling.

use crate::config::chain::{ChainMember, ChainMode};
use crate::config::loadout::Loadout;
use crate::config::SLOT_COUNT;
use crate::data::ability::Ability;
use crate::data::catalog::Catalog;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSlot {
    pub slot: usize,
    pub ability: Ability,
    /// 0-based index into `ability.levels`.
    pub level_index: usize,
    pub enabled: bool,
    pub solo_usable: bool,
    pub combo_repeat: u32,
    pub priority: Option<u8>,
    /// Automatic chain reserving this slot.
    pub chain: Option<usize>,
}

impl PlannedSlot {
    pub fn max_charges(&self) -> u32 {
        self.ability.max_charges
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChain {
    pub mode: ChainMode,
    /// Firing order as configured.
    pub members: Vec<ChainMember>,
    /// Aggregated count per distinct slot.
    pub requirements: Vec<ChainMember>,
    /// False when some slot needs more casts than its ability can hold.
    pub satisfiable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationPlan {
    pub slots: [Option<PlannedSlot>; SLOT_COUNT],
    pub chains: Vec<PlannedChain>,
}

impl RotationPlan {
    /// Validate `loadout` and bind every slot to its catalog entry.
    pub fn resolve(loadout: &Loadout, catalog: &Catalog) -> Result<Self, ConfigError> {
        loadout.validate(catalog)?;

        let mut slots: [Option<PlannedSlot>; SLOT_COUNT] = std::array::from_fn(|_| None);
        for equip in &loadout.equipped {
            let ability = catalog
                .ability(&loadout.server, &loadout.job, equip.ability.as_str())
                .ok_or_else(|| ConfigError::UnknownAbility {
                    server: loadout.server.clone(),
                    job: loadout.job.clone(),
                    ability: equip.ability.to_string(),
                })?;
            slots[equip.slot] = Some(PlannedSlot {
                slot: equip.slot,
                ability: ability.clone(),
                level_index: equip.level - 1,
                enabled: equip.enabled,
                solo_usable: equip.solo_usable,
                combo_repeat: equip.combo_repeat,
                priority: equip.priority,
                chain: loadout.automatic_chain_of(equip.slot),
            });
        }

        let chains = loadout
            .chains
            .iter()
            .map(|chain| {
                let requirements = chain.requirements();
                let satisfiable = requirements.iter().all(|req| {
                    slots[req.slot]
                        .as_ref()
                        .is_some_and(|planned| req.count <= planned.max_charges())
                });
                PlannedChain {
                    mode: chain.mode,
                    members: chain.members.clone(),
                    requirements,
                    satisfiable,
                }
            })
            .collect();

        let plan = Self { slots, chains };
        debug_assert!(
            plan.automatic_chains_are_exclusive(),
            "a slot is reserved by two automatic chains"
        );
        Ok(plan)
    }

    pub fn slot(&self, slot: usize) -> Option<&PlannedSlot> {
        self.slots.get(slot)?.as_ref()
    }

    pub fn equipped(&self) -> impl Iterator<Item = &PlannedSlot> {
        self.slots.iter().flatten()
    }

    pub fn max_charges(&self, slot: usize) -> u32 {
        self.slot(slot).map_or(0, PlannedSlot::max_charges)
    }

    /// Explicitly ranked slots, highest priority (lowest rank) first.
    pub fn ranked_slots(&self) -> Vec<usize> {
        let mut ranked: Vec<(u8, usize)> = self
            .equipped()
            .filter_map(|planned| planned.priority.map(|p| (p, planned.slot)))
            .collect();
        ranked.sort_unstable();
        ranked.into_iter().map(|(_, slot)| slot).collect()
    }

    fn automatic_chains_are_exclusive(&self) -> bool {
        let mut owner = [None; SLOT_COUNT];
        for (index, chain) in self.chains.iter().enumerate() {
            if chain.mode != ChainMode::Automatic {
                continue;
            }
            for req in &chain.requirements {
                match owner[req.slot] {
                    Some(other) if other != index => return false,
                    _ => owner[req.slot] = Some(index),
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::chain::Chain;
    use crate::config::loadout::EquippedAbility;
    use crate::data::ability::{AbilityId, AbilityLevel, TimedEffect};

    fn catalog() -> Catalog {
        let ability = |id: &str, max_charges| Ability {
            id: AbilityId::from(id),
            name: String::new(),
            cooldown: 4.0,
            max_charges,
            casting: false,
            levels: vec![AbilityLevel {
                combos: vec![vec![TimedEffect::damage(0.0, 1.0)]],
            }],
        };
        Catalog::single_job("s", "j", vec![ability("a", 2), ability("b", 1), ability("c", 1)])
    }

    #[test]
    fn resolve_binds_slots_and_chain_membership() {
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = vec![
            EquippedAbility::new(0, "a"),
            EquippedAbility::new(3, "b"),
            EquippedAbility {
                priority: Some(1),
                ..EquippedAbility::new(5, "c")
            },
        ];
        loadout.chains = vec![Chain::automatic(vec![
            ChainMember::new(0, 2),
            ChainMember::new(3, 1),
        ])];
        let plan = RotationPlan::resolve(&loadout, &catalog()).unwrap();
        assert_eq!(plan.slot(0).and_then(|s| s.chain), Some(0));
        assert_eq!(plan.slot(5).and_then(|s| s.chain), None);
        assert!(plan.slot(1).is_none());
        assert_eq!(plan.ranked_slots(), vec![5]);
        assert!(plan.chains[0].satisfiable);
    }

    #[test]
    fn overdrawn_chain_is_resolved_as_unsatisfiable() {
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = vec![EquippedAbility::new(0, "a"), EquippedAbility::new(1, "b")];
        loadout.chains = vec![Chain::automatic(vec![
            ChainMember::new(1, 1),
            ChainMember::new(1, 1),
        ])];
        let plan = RotationPlan::resolve(&loadout, &catalog()).unwrap();
        assert!(!plan.chains[0].satisfiable);
        assert_eq!(plan.chains[0].requirements, vec![ChainMember::new(1, 2)]);
    }

    #[test]
    fn resolve_rejects_invalid_loadout() {
        let mut loadout = Loadout::new("s", "j");
        loadout.equipped = vec![EquippedAbility::new(7, "a")];
        assert_eq!(
            RotationPlan::resolve(&loadout, &catalog()),
            Err(ConfigError::SlotOutOfRange(7))
        );
    }
}
