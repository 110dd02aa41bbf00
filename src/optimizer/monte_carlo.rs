use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::engine::{total_damage, AttackEvent, Encounter, Roll, Target};
use crate::combat::power::{powers_from_totals, PowerCategory, Powers};
use crate::combat::rng::{entropy_seed, Rng};
use crate::config::{Loadout, RotationPlan};
use crate::optimizer::aggregate::{summarize, AggregateError, SampleSummary};
use crate::optimizer::model::PowerModel;
use crate::parallel::{batch_ranges, WorkerPool};
use crate::scheduler::DEFAULT_DURATION_MS;

pub const DEFAULT_ITERATIONS: usize = 1000;

/// Number of progress-reporting batches the runs are split into.
const PROGRESS_BATCH_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub iterations: usize,
    /// Base seed; run `i` uses `seed + i`. Drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Keep every sampled boss attack list in the result.
    pub keep_runs: bool,
    /// Worker threads; 0 uses every core.
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            keep_runs: false,
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: PowerCategory,
    /// Deterministic value.
    pub number: f64,
    #[serde(flatten)]
    pub spread: SampleSummary,
}

impl CategorySummary {
    fn scaled(&self, factor: f64) -> Self {
        let s = self.spread;
        Self {
            category: self.category,
            number: self.number * factor,
            spread: SampleSummary {
                min: s.min * factor,
                max: s.max * factor,
                std: s.std * factor,
                p25: s.p25 * factor,
                p50: s.p50 * factor,
                p75: s.p75 * factor,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub seed: u64,
    pub iterations: usize,
    pub categories: Vec<CategorySummary>,
    pub deterministic_boss_attacks: Vec<AttackEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampled_boss_attacks: Option<Vec<Vec<AttackEvent>>>,
}

impl SimulationResult {
    pub fn category(&self, category: PowerCategory) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// The same summaries divided by the encounter length in seconds.
    pub fn per_second(&self) -> Vec<CategorySummary> {
        let seconds = DEFAULT_DURATION_MS as f64 / 1000.0;
        self.categories.iter().map(|c| c.scaled(1.0 / seconds)).collect()
    }
}

struct RunOutcome {
    powers: Powers,
    boss_attacks: Option<Vec<AttackEvent>>,
}

fn run_once(
    encounter: &Encounter,
    model: &PowerModel<'_>,
    seed: u64,
    keep_attacks: bool,
) -> RunOutcome {
    let stats = model.base_stats();
    let sim_info = model.sim_info();
    let mut rng = Rng::new(seed);
    let boss = encounter.run(stats, sim_info, Target::Boss, Roll::Sampled(&mut rng));
    let normal = encounter.run(stats, sim_info, Target::Normal, Roll::Sampled(&mut rng));
    RunOutcome {
        powers: powers_from_totals(total_damage(&boss), total_damage(&normal), stats, sim_info),
        boss_attacks: keep_attacks.then_some(boss),
    }
}

pub fn simulate(
    plan: &RotationPlan,
    loadout: &Loadout,
    config: &SimulationConfig,
) -> Result<SimulationResult, AggregateError> {
    simulate_with_progress(plan, loadout, config, |_, _| {})
}

/// Like [simulate] but runs in batches and invokes `on_progress(done, total)`
/// after each. Results are identical for a given seed.
pub fn simulate_with_progress<F>(
    plan: &RotationPlan,
    loadout: &Loadout,
    config: &SimulationConfig,
    mut on_progress: F,
) -> Result<SimulationResult, AggregateError>
where
    F: FnMut(usize, usize),
{
    if config.iterations == 0 {
        return Err(AggregateError::EmptySample);
    }
    let seed = config.seed.unwrap_or_else(entropy_seed);
    let model = PowerModel::new(plan, loadout);
    let encounter = model.encounter(model.base_stats());
    let deterministic = model.evaluate_encounter(&encounter, model.base_stats());
    log::info!(
        "simulating {} runs over {} hits (seed {seed})",
        config.iterations,
        encounter.hits.len()
    );

    let pool = WorkerPool::with_workers(config.workers);
    let total = config.iterations;
    let mut outcomes: Vec<RunOutcome> = Vec::with_capacity(total);
    for range in batch_ranges(total, PROGRESS_BATCH_COUNT) {
        let end = range.end;
        let batch: Vec<RunOutcome> = pool.install(|| {
            range
                .into_par_iter()
                .map(|i| run_once(&encounter, &model, seed.wrapping_add(i as u64), config.keep_runs))
                .collect()
        });
        outcomes.extend(batch);
        log::debug!("completed {end}/{total} runs");
        on_progress(end, total);
    }

    let mut categories = Vec::with_capacity(PowerCategory::ALL.len());
    for category in PowerCategory::ALL {
        let sample: Vec<f64> = outcomes.iter().map(|o| o.powers.get(category)).collect();
        categories.push(CategorySummary {
            category,
            number: deterministic.powers.get(category),
            spread: summarize(&sample)?,
        });
    }

    let sampled_boss_attacks = config
        .keep_runs
        .then(|| outcomes.into_iter().filter_map(|o| o.boss_attacks).collect());

    Ok(SimulationResult {
        seed,
        iterations: total,
        categories,
        deterministic_boss_attacks: deterministic.boss_attacks,
        sampled_boss_attacks,
    })
}
