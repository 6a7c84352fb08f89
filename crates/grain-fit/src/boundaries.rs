use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use grain_core::config::{BoundaryMode, GradingConfig};
use grain_core::errors::{ErrorInfo, FailureTally, GrainError};
use grain_core::types::{Distribution, GradingRange, CLASS_COUNT, SIEVE_OPENINGS};

use crate::distribution::fit_classes;
use crate::gaussian::{intersect, Intersection};
use crate::ranges::{check_monotonic, ranges_from_boundaries, std_multiple_ranges};

/// Distributions, boundaries and ranges produced for one calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryReport {
    /// Per-class fitted distributions.
    pub distributions: Vec<Distribution>,
    /// Adjacent-pair boundaries; empty unless boundaries come from intersections.
    pub intersections: Vec<Intersection>,
    /// Per-class grading ranges.
    pub ranges: Vec<GradingRange>,
    /// Empty classes and solver fallbacks.
    pub failures: FailureTally,
}

fn fallback_boundary(index: usize, left: &Distribution, right: &Distribution) -> f64 {
    if left.is_empty() || right.is_empty() {
        SIEVE_OPENINGS.get(index + 1).copied().unwrap_or(0.0)
    } else {
        0.5 * (left.mean + right.mean)
    }
}

/// Boundaries for every adjacent pair.
///
/// A pair whose solver fails falls back to the midpoint of its means, or to
/// the nominal sieve opening when one side has no data. Boundaries are then
/// forced to be non-decreasing.
pub fn adjacent_intersections(
    distributions: &[Distribution],
    config: &GradingConfig,
    failures: &mut FailureTally,
) -> Vec<Intersection> {
    let mut floor = 0.0f64;
    distributions
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (left, right) = (&pair[0], &pair[1]);
            let (x, fallback) = match intersect(left, right, &config.root_find) {
                Ok(x) => (x, false),
                Err(err) => {
                    let x = fallback_boundary(index, left, right);
                    warn!(pair = index, error = %err, fallback = x, "using fallback boundary");
                    failures.record_error(&err);
                    (x, true)
                }
            };
            if x < floor {
                warn!(pair = index, boundary = x, floor, "boundary raised to keep ranges ordered");
            }
            floor = floor.max(x);
            Intersection::at(index, left, right, floor, fallback)
        })
        .collect()
}

/// Derives grading ranges from already-fitted distributions.
pub fn derive_boundaries(
    distributions: &[Distribution],
    config: &GradingConfig,
) -> Result<BoundaryReport, GrainError> {
    if distributions.len() != CLASS_COUNT {
        return Err(GrainError::Config(
            ErrorInfo::new("class_count", "one distribution per size class is required")
                .with_context("expected", CLASS_COUNT)
                .with_context("found", distributions.len()),
        ));
    }
    let mut failures = FailureTally::new();
    let (intersections, ranges) = match &config.grade_boundaries {
        BoundaryMode::Intersection => {
            let intersections = adjacent_intersections(distributions, config, &mut failures);
            let xs: Vec<f64> = intersections.iter().map(|i| i.x).collect();
            let ranges = ranges_from_boundaries(distributions, &xs, config.extension_ratio)?;
            (intersections, ranges)
        }
        BoundaryMode::StdMultiple { multiple } => {
            (Vec::new(), std_multiple_ranges(distributions, *multiple))
        }
        BoundaryMode::Explicit { ranges } => (Vec::new(), ranges.clone()),
    };
    check_monotonic(&ranges)?;
    info!(
        mode = ?config.grade_boundaries,
        fallbacks = failures.total(),
        "grading ranges derived"
    );
    Ok(BoundaryReport {
        distributions: distributions.to_vec(),
        intersections,
        ranges,
        failures,
    })
}

/// Fits calibration measurements per class and derives grading ranges.
pub fn calibrate(classes: &[Vec<f64>], config: &GradingConfig) -> Result<BoundaryReport, GrainError> {
    let fit = fit_classes(classes);
    let mut report = derive_boundaries(&fit.distributions, config)?;
    report.failures.merge(&fit.failures);
    Ok(report)
}
