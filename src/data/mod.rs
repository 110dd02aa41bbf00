pub mod ability;
pub mod catalog;
pub mod loader;

pub use ability::{Ability, AbilityId, AbilityLevel, Effect, TimedEffect};
pub use catalog::{catalog_path_from_env, Catalog, JobCatalog, ServerCatalog, DEFAULT_CATALOG_PATH};
