//! Caller-supplied configuration: stats, equipped slots, chains and encounter info.

pub mod chain;
pub mod loadout;
pub mod plan;
pub mod stats;
pub mod validate;

pub use chain::{Chain, ChainDraft, ChainMember, ChainMode};
pub use loadout::{EquippedAbility, Loadout, SimInfo};
pub use plan::{PlannedChain, PlannedSlot, RotationPlan};
pub use stats::{CharacterStats, Stat, StatRange, STAT_COUNT};
pub use validate::{validate_loadout, ValidationDiagnostic, ValidationReport, ValidationSeverity};

/// Number of equippable ability slots.
pub const SLOT_COUNT: usize = 6;

pub const DEFAULT_CAST_DELAY_MS: u64 = 150;
pub const MIN_CAST_DELAY_MS: u64 = 50;
pub const MAX_CAST_DELAY_MS: u64 = 1000;
