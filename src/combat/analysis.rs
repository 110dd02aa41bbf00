//! Time-series breakdowns of attack event lists for reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::combat::engine::AttackEvent;
use crate::optimizer::aggregate::AggregateError;
use crate::scheduler::CastSource;

pub const STEP_SECONDS: f64 = 1.0;
pub const STEP_COUNT: usize = 60;
pub const DISTRIBUTION_BINS: usize = 15;

/// Damage dealt in each `[k*step, (k+1)*step)` bucket, preceded by a 0 sample
/// so the series lines up with the time axis `0, step, ..., count*step`.
pub fn damage_per_step(events: &[AttackEvent], step: f64, count: usize) -> Vec<f64> {
    let mut buckets = vec![0.0; count + 1];
    for event in events {
        if event.time < 0.0 {
            continue;
        }
        let bucket = (event.time / step).floor() as usize;
        if bucket < count {
            buckets[bucket + 1] += event.damage;
        }
    }
    buckets
}

pub fn cumulative(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .scan(0.0, |acc, x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

pub fn time_axis(step: f64, count: usize) -> Vec<f64> {
    (0..=count).map(|i| i as f64 * step).collect()
}

/// Pointwise min / mean / max across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub time: Vec<f64>,
    pub min: Vec<f64>,
    pub mean: Vec<f64>,
    pub max: Vec<f64>,
}

pub fn band(series: &[Vec<f64>], step: f64) -> Result<Band, AggregateError> {
    let len = series
        .iter()
        .map(Vec::len)
        .min()
        .ok_or(AggregateError::EmptySample)?;
    let mut min = vec![f64::INFINITY; len];
    let mut max = vec![f64::NEG_INFINITY; len];
    let mut mean = vec![0.0; len];
    for run in series {
        for i in 0..len {
            min[i] = min[i].min(run[i]);
            max[i] = max[i].max(run[i]);
            mean[i] += run[i];
        }
    }
    let n = series.len() as f64;
    mean.iter_mut().for_each(|m| *m /= n);
    Ok(Band {
        time: time_axis(step, len.saturating_sub(1)),
        min,
        mean,
        max,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceShare {
    pub source: CastSource,
    pub damage: f64,
    /// Percent of the run total.
    pub share: f64,
}

/// Damage per source as a share of the total, ordered by source.
pub fn source_shares(events: &[AttackEvent]) -> Vec<SourceShare> {
    let mut by_source: BTreeMap<CastSource, f64> = BTreeMap::new();
    for event in events {
        *by_source.entry(event.source).or_default() += event.damage;
    }
    let total: f64 = by_source.values().sum();
    by_source
        .into_iter()
        .map(|(source, damage)| SourceShare {
            source,
            damage,
            share: if total > 0.0 { damage / total * 100.0 } else { 0.0 },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSeries {
    pub source: CastSource,
    pub values: Vec<f64>,
}

/// For each source, its fraction of all damage dealt up to each time mark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub time: Vec<f64>,
    pub sources: Vec<SourceSeries>,
}

pub fn contribution_over_time(events: &[AttackEvent], step: f64, count: usize) -> Contribution {
    let mut sources: BTreeMap<CastSource, Vec<f64>> = BTreeMap::new();
    for event in events {
        sources.entry(event.source).or_insert_with(|| vec![0.0; count + 1]);
    }

    for k in 1..=count {
        let cutoff = k as f64 * step;
        let total: f64 = events
            .iter()
            .filter(|e| e.time < cutoff)
            .map(|e| e.damage)
            .sum();
        if total <= 0.0 {
            continue;
        }
        for (source, ratios) in sources.iter_mut() {
            let dealt: f64 = events
                .iter()
                .filter(|e| e.source == *source && e.time < cutoff)
                .map(|e| e.damage)
                .sum();
            ratios[k] = dealt / total;
        }
    }

    Contribution {
        time: time_axis(step, count),
        sources: sources
            .into_iter()
            .map(|(source, values)| SourceSeries { source, values })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram; the last bin includes its upper edge.
pub fn histogram(values: &[f64], bins: usize) -> Result<Vec<HistogramBin>, AggregateError> {
    if values.is_empty() || bins == 0 {
        return Err(AggregateError::EmptySample);
    }
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (low, high) = if high > low {
        (low, high)
    } else {
        (low - 0.5, high + 0.5)
    };
    let width = (high - low) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: low + i as f64 * width,
            upper: low + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for value in values {
        let index = (((value - low) / width).floor() as usize).min(bins - 1);
        out[index].count += 1;
    }
    Ok(out)
}

/// Everything the reporting views need from one batch of runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub damage_per_second: Band,
    pub cumulative_damage: Band,
    pub shares: Vec<SourceShare>,
    pub contribution: Contribution,
    pub distribution: Vec<HistogramBin>,
}

/// Bands and distribution come from `runs`; shares and contribution from
/// the single `reference` run.
pub fn analyze(runs: &[Vec<AttackEvent>], reference: &[AttackEvent]) -> Result<Analysis, AggregateError> {
    let per_step: Vec<Vec<f64>> = runs
        .iter()
        .map(|run| damage_per_step(run, STEP_SECONDS, STEP_COUNT))
        .collect();
    let cumulative_runs: Vec<Vec<f64>> = per_step.iter().map(|s| cumulative(s)).collect();
    let totals: Vec<f64> = runs
        .iter()
        .map(|run| run.iter().map(|e| e.damage).sum())
        .collect();

    Ok(Analysis {
        damage_per_second: band(&per_step, STEP_SECONDS)?,
        cumulative_damage: band(&cumulative_runs, STEP_SECONDS)?,
        shares: source_shares(reference),
        contribution: contribution_over_time(reference, STEP_SECONDS, STEP_COUNT),
        distribution: histogram(&totals, DISTRIBUTION_BINS)?,
    })
}
