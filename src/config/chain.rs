//! Link skills: ordered ability bundles fired as one unit.
//!
//! A chain is edited through a [ChainDraft]. The draft is a private copy; the
//! loadout only sees the chain once [ChainDraft::commit] has validated it, so a
//! half-edited chain is never observable by the scheduler.

use serde::{Deserialize, Serialize};

use crate::config::loadout::{chain_shape_errors, Loadout};
use crate::data::catalog::Catalog;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// Fired by the scheduler as soon as every member is ready.
    #[default]
    Automatic,
    /// Fired only on an external trigger.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMember {
    pub slot: usize,
    pub count: u32,
}

impl ChainMember {
    pub fn new(slot: usize, count: u32) -> Self {
        Self { slot, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub members: Vec<ChainMember>,
    #[serde(default)]
    pub mode: ChainMode,
    #[serde(default)]
    pub trigger_key: Option<String>,
}

impl Chain {
    pub fn automatic(members: Vec<ChainMember>) -> Self {
        Self {
            members,
            mode: ChainMode::Automatic,
            trigger_key: None,
        }
    }

    /// Distinct member slots in first-appearance order.
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter(|(i, m)| !self.members[..*i].iter().any(|prev| prev.slot == m.slot))
            .map(|(_, m)| m.slot)
    }

    /// Total casts required per distinct slot, in first-appearance order.
    pub fn requirements(&self) -> Vec<ChainMember> {
        let mut totals: Vec<ChainMember> = Vec::new();
        for member in &self.members {
            match totals.iter_mut().find(|t| t.slot == member.slot) {
                Some(total) => total.count += member.count,
                None => totals.push(*member),
            }
        }
        totals
    }
}

/// Editable copy of a chain. Nothing changes in the loadout until `commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDraft {
    editing: Option<usize>,
    chain: Chain,
}

impl ChainDraft {
    /// Draft for a chain that does not exist yet.
    pub fn new(mode: ChainMode) -> Self {
        Self {
            editing: None,
            chain: Chain {
                members: Vec::new(),
                mode,
                trigger_key: None,
            },
        }
    }

    /// Draft seeded from an existing chain.
    pub fn edit(loadout: &Loadout, index: usize) -> Result<Self, ConfigError> {
        let chain = loadout
            .chains
            .get(index)
            .cloned()
            .ok_or(ConfigError::UnknownChain(index))?;
        Ok(Self {
            editing: Some(index),
            chain,
        })
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn push_member(&mut self, slot: usize, count: u32) -> &mut Self {
        self.chain.members.push(ChainMember::new(slot, count));
        self
    }

    pub fn remove_member(&mut self, position: usize) -> Option<ChainMember> {
        (position < self.chain.members.len()).then(|| self.chain.members.remove(position))
    }

    pub fn set_count(&mut self, position: usize, count: u32) -> &mut Self {
        if let Some(member) = self.chain.members.get_mut(position) {
            member.count = count;
        }
        self
    }

    pub fn set_mode(&mut self, mode: ChainMode) -> &mut Self {
        self.chain.mode = mode;
        self
    }

    pub fn set_trigger_key(&mut self, key: Option<String>) -> &mut Self {
        self.chain.trigger_key = key;
        self
    }

    /// Validate the draft against the loadout and store it. Returns the chain
    /// index. On error the loadout is left untouched.
    pub fn commit(self, loadout: &mut Loadout, catalog: &Catalog) -> Result<usize, ConfigError> {
        let index = self.editing.unwrap_or(loadout.chains.len());
        if self.editing.is_some_and(|i| i >= loadout.chains.len()) {
            return Err(ConfigError::UnknownChain(index));
        }
        if let Some(err) = chain_shape_errors(loadout, index, &self.chain).into_iter().next() {
            return Err(err);
        }

        for requirement in self.chain.requirements() {
            let max = loadout
                .ability_in(catalog, requirement.slot)
                .map(|ability| ability.max_charges)
                .unwrap_or(0);
            if requirement.count > max {
                return Err(ConfigError::ChainOverdrawn {
                    slot: requirement.slot,
                    required: requirement.count,
                    max,
                });
            }
        }

        if self.chain.mode == ChainMode::Automatic {
            for slot in self.chain.slots() {
                let owner = loadout.chains.iter().enumerate().find(|(i, other)| {
                    *i != index
                        && other.mode == ChainMode::Automatic
                        && other.members.iter().any(|m| m.slot == slot)
                });
                if let Some((first, _)) = owner {
                    return Err(ConfigError::SharedChainSlot {
                        slot,
                        first,
                        second: index,
                    });
                }
            }
        }

        match self.editing {
            Some(i) => loadout.chains[i] = self.chain,
            None => loadout.chains.push(self.chain),
        }
        Ok(index)
    }
}
