use serde::{Deserialize, Serialize};

use grain_core::errors::{ErrorInfo, FailureTally, GrainError};
use grain_core::types::Distribution;

/// Half-width, in standard deviations, of the window kept by the second pass.
pub const TRIM_STD_MULTIPLE: f64 = 1.5;

/// Population mean and standard deviation, `None` for an empty slice.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// Two-pass fit of one class.
///
/// The second pass keeps only values within `TRIM_STD_MULTIPLE` standard
/// deviations of the first-pass mean, which removes mis-segmented outliers.
pub fn fit_class(samples: &[f64]) -> Result<Distribution, GrainError> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    let Some((mean, std_dev)) = mean_and_std(&finite) else {
        return Err(GrainError::EmptyClass(
            ErrorInfo::new("no_samples", "class has no finite measurements")
                .with_context("raw", samples.len()),
        ));
    };
    let low = mean - TRIM_STD_MULTIPLE * std_dev;
    let high = mean + TRIM_STD_MULTIPLE * std_dev;
    let kept: Vec<f64> = finite
        .into_iter()
        .filter(|v| *v >= low && *v <= high)
        .collect();
    match mean_and_std(&kept) {
        Some((mean, std_dev)) => Ok(Distribution {
            mean,
            std_dev,
            count: kept.len(),
        }),
        None => Ok(Distribution {
            mean,
            std_dev,
            count: 0,
        }),
    }
}

/// Fitted distributions for every class plus the classes that had no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// One distribution per class; empty classes carry [`Distribution::empty`].
    pub distributions: Vec<Distribution>,
    /// Empty-class failures.
    pub failures: FailureTally,
}

/// Fits every class independently.
pub fn fit_classes(classes: &[Vec<f64>]) -> FitReport {
    let mut failures = FailureTally::new();
    let distributions = classes
        .iter()
        .enumerate()
        .map(|(index, samples)| match fit_class(samples) {
            Ok(distribution) => distribution,
            Err(err) => {
                tracing::warn!(class = index, error = %err, "class has no calibration data");
                failures.record_error(&err);
                Distribution::empty()
            }
        })
        .collect();
    FitReport {
        distributions,
        failures,
    }
}
