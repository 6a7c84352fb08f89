use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::{Distribution, GradingRange, RANGE_SENTINEL};

/// Grading ranges whose inner bounds sit at the adjacent-class boundaries.
///
/// Each bound is pushed outward by `ratio` times the owning class's
/// std-dev, so neighbouring ranges overlap when `ratio > 0`.
pub fn ranges_from_boundaries(
    distributions: &[Distribution],
    boundaries: &[f64],
    ratio: f64,
) -> Result<Vec<GradingRange>, GrainError> {
    let n = distributions.len();
    if n == 0 || boundaries.len() + 1 != n {
        return Err(GrainError::Config(
            ErrorInfo::new("boundary_count", "need one boundary between each pair of classes")
                .with_context("classes", n)
                .with_context("boundaries", boundaries.len()),
        ));
    }
    let ranges = (0..n)
        .map(|i| {
            let widen = distributions[i].std_dev * ratio;
            let lower = if i == 0 {
                0.0
            } else {
                (boundaries[i - 1] - widen).max(0.0)
            };
            let upper = if i + 1 == n {
                RANGE_SENTINEL
            } else {
                boundaries[i] + widen
            };
            GradingRange::new(lower, upper)
        })
        .collect();
    Ok(ranges)
}

/// Ranges `mean ± multiple · std_dev`, with the outermost bounds opened to `0` and the sentinel.
pub fn std_multiple_ranges(distributions: &[Distribution], multiple: f64) -> Vec<GradingRange> {
    let n = distributions.len();
    distributions
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let lower = if i == 0 {
                0.0
            } else {
                (d.mean - multiple * d.std_dev).max(0.0)
            };
            let upper = if i + 1 == n {
                RANGE_SENTINEL
            } else {
                d.mean + multiple * d.std_dev
            };
            GradingRange::new(lower, upper)
        })
        .collect()
}

/// Checks that lower and upper bounds never decrease from class to class.
pub fn check_monotonic(ranges: &[GradingRange]) -> Result<(), GrainError> {
    for (i, pair) in ranges.windows(2).enumerate() {
        if pair[1].lower < pair[0].lower || pair[1].upper < pair[0].upper {
            return Err(GrainError::Config(
                ErrorInfo::new("ranges_not_monotonic", "grading ranges must not decrease")
                    .with_context("class", i + 1)
                    .with_hint("check that calibration classes are ordered from fine to coarse"),
            ));
        }
    }
    for (i, range) in ranges.iter().enumerate() {
        if !(range.lower <= range.upper) {
            return Err(GrainError::Config(
                ErrorInfo::new("range_inverted", "lower bound exceeds upper bound")
                    .with_context("class", i),
            ));
        }
    }
    Ok(())
}
