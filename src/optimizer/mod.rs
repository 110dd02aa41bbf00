pub mod aggregate;
pub mod model;
pub mod monte_carlo;
pub mod solver;

pub use aggregate::{percentile, summarize, AggregateError, SampleSummary};
pub use model::{Evaluation, PowerModel};
pub use monte_carlo::{
    simulate, simulate_with_progress, CategorySummary, SimulationConfig, SimulationResult,
    DEFAULT_ITERATIONS,
};
pub use solver::{required_delta, required_deltas, SolveOutcome};
