//! Error types surfaced by configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::stats::Stat;

/// A loadout that cannot be scheduled. Returned before any scheduling begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{stat} = {value} is outside the allowed range [{min}, {max}]")]
    StatOutOfRange {
        stat: Stat,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("cooldown reduction {0} is outside the allowed range [0, 50]")]
    CooldownReductionOutOfRange(f64),
    #[error("cast delay {0} ms is outside the allowed range [50, 1000]")]
    CastDelayOutOfRange(u64),
    #[error("slot {0} does not exist")]
    SlotOutOfRange(usize),
    #[error("slot {0} is equipped twice")]
    SlotTaken(usize),
    #[error("ability '{ability}' is not in the catalog for {server}/{job}")]
    UnknownAbility {
        server: String,
        job: String,
        ability: String,
    },
    #[error("ability '{ability}' has no level {level}")]
    UnknownLevel { ability: String, level: usize },
    #[error("ability '{ability}' is equipped in both slot {first} and slot {second}")]
    DuplicateEquip {
        ability: String,
        first: usize,
        second: usize,
    },
    #[error("chain {0} does not exist")]
    UnknownChain(usize),
    #[error("chain {chain} has no members")]
    EmptyChain { chain: usize },
    #[error("chain {chain} references empty slot {slot}")]
    ChainSlotEmpty { chain: usize, slot: usize },
    #[error("chain {chain} requires zero casts of slot {slot}")]
    ZeroChainCount { chain: usize, slot: usize },
    #[error("slot {slot} belongs to automatic chains {first} and {second}")]
    SharedChainSlot {
        slot: usize,
        first: usize,
        second: usize,
    },
    #[error("chain requires {required} casts of slot {slot} but the ability holds {max} charges")]
    ChainOverdrawn {
        slot: usize,
        required: u32,
        max: u32,
    },
    #[error("priority {priority} is outside 1..=6")]
    PriorityOutOfRange { priority: u8 },
    #[error("priority {priority} is assigned to both slot {first} and slot {second}")]
    DuplicatePriority {
        priority: u8,
        first: usize,
        second: usize,
    },
    #[error("slot {slot} repeats {value} times per use but the ability holds {max} charges")]
    ComboRepeatOutOfRange { slot: usize, value: u32, max: u32 },
}

/// Failure reading or writing a data file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("unable to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse json '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to parse yaml '{}': {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unable to write csv '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failure reading a loadout file or resolving it against the catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The live loop task has exited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveError {
    #[error("live scheduler has stopped")]
    Stopped,
}
