pub mod analysis;
pub mod buffs;
pub mod engine;
pub mod export;
pub mod power;
pub mod rng;
pub mod tier;

pub use analysis::{analyze, Analysis, Band, Contribution, HistogramBin, SourceShare};
pub use buffs::{merge_buffs, stats_at, BuffInterval};
pub use engine::{
    base_damage, expected_damage, round_to, sampled_damage, total_damage, AttackEvent,
    Encounter, Hit, Roll, Target,
};
pub use power::{powers_from_totals, PowerCategory, Powers};
pub use rng::Rng;
pub use tier::{tier_difference, tier_multiplier};
