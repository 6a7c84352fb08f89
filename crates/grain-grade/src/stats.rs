use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arithmetic mean, zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n − 1 denominator), zero with fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Linear-interpolation percentile of sorted values, `quantile` in `[0, 1]`.
pub fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let position = quantile * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Most frequent value after rounding to the nearest integer, `None` on a tie.
pub fn rounded_mode(values: &[f64]) -> Option<f64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values.iter().filter(|v| v.is_finite()) {
        *counts.entry(value.round() as i64).or_insert(0) += 1;
    }
    let best = counts.values().copied().max()?;
    let mut winners = counts.iter().filter(|(_, count)| **count == best);
    let (value, _) = winners.next()?;
    if winners.next().is_some() {
        None
    } else {
        Some(*value as f64)
    }
}

/// Descriptive statistics of one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Largest value.
    pub max: f64,
    /// Smallest value.
    pub min: f64,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Sample variance.
    pub variance: f64,
    /// Median.
    pub median: f64,
    /// First quartile.
    pub q1: f64,
    /// Third quartile.
    pub q3: f64,
    /// Mode of the values rounded to integers, absent when not unique.
    pub mode: Option<f64>,
}

impl SummaryStats {
    /// Summarises `values`; all zeros for an empty series.
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));
        let variance = sample_variance(&sorted);
        Self {
            max: sorted[sorted.len() - 1],
            min: sorted[0],
            mean: mean(&sorted),
            std_dev: variance.sqrt(),
            variance,
            median: percentile(&sorted, 0.5),
            q1: percentile(&sorted, 0.25),
            q3: percentile(&sorted, 0.75),
            mode: rounded_mode(&sorted),
        }
    }
}
