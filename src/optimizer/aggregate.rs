//! Summary statistics over a sample of per-run values.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("cannot summarize an empty sample")]
    EmptySample,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SampleSummary {
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Linear-interpolated percentile of an ascending sample, `p` in `0..=100`.
pub fn percentile(sorted: &[f64], p: f64) -> Result<f64, AggregateError> {
    if sorted.is_empty() {
        return Err(AggregateError::EmptySample);
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64 + 1.0;
    let whole = rank.floor();
    let lower = (whole as usize).saturating_sub(1).min(sorted.len() - 1);
    let value = match sorted.get(lower + 1) {
        Some(next) => sorted[lower] + (rank - whole) * (next - sorted[lower]),
        None => sorted[lower],
    };
    Ok(value)
}

pub fn population_std(values: &[f64]) -> Result<f64, AggregateError> {
    if values.is_empty() {
        return Err(AggregateError::EmptySample);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(variance.sqrt())
}

pub fn summarize(values: &[f64]) -> Result<SampleSummary, AggregateError> {
    if values.is_empty() {
        return Err(AggregateError::EmptySample);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(SampleSummary {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        std: population_std(&sorted)?,
        p25: percentile(&sorted, 25.0)?,
        p50: percentile(&sorted, 50.0)?,
        p75: percentile(&sorted, 75.0)?,
    })
}
