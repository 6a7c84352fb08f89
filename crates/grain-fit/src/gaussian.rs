use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use grain_core::config::RootFindOptions;
use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::types::Distribution;

/// Gaussian density of `d` scaled to a peak of 1.
pub fn peak_normalized_density(x: f64, d: &Distribution) -> f64 {
    let z = (x - d.mean) / d.std_dev;
    (-0.5 * z * z).exp()
}

fn log_ratio(x: f64, left: &Distribution, right: &Distribution) -> (f64, f64) {
    let zl = (x - left.mean) / left.std_dev;
    let zr = (x - right.mean) / right.std_dev;
    let value = 0.5 * (zr * zr - zl * zl);
    let slope = (x - right.mean) / (right.std_dev * right.std_dev)
        - (x - left.mean) / (left.std_dev * left.std_dev);
    (value, slope)
}

fn usable(d: &Distribution) -> bool {
    d.count > 0 && d.mean.is_finite() && d.std_dev.is_finite() && d.std_dev > 0.0
}

/// Point between the two means where the peak-normalised densities are equal.
///
/// The equation is solved on the log ratio of the two densities, which has
/// the same roots and does not underflow far from the means. Newton steps
/// start at the midpoint of the means and fall back to bisection whenever a
/// step would leave the bracket `[mean_left, mean_right]`.
pub fn intersect(
    left: &Distribution,
    right: &Distribution,
    opts: &RootFindOptions,
) -> Result<f64, GrainError> {
    if !usable(left) || !usable(right) {
        return Err(GrainError::RootFind(
            ErrorInfo::new("unusable_distribution", "both classes need data and a positive std-dev")
                .with_context("left_std", left.std_dev)
                .with_context("right_std", right.std_dev)
                .with_context("left_count", left.count)
                .with_context("right_count", right.count),
        ));
    }
    let (mut lo, mut hi) = (left.mean.min(right.mean), left.mean.max(right.mean));
    let lo_positive = log_ratio(lo, left, right).0 > 0.0;
    let mut x = 0.5 * (left.mean + right.mean);
    for _ in 0..opts.max_iters {
        let (value, slope) = log_ratio(x, left, right);
        if value.abs() <= opts.tolerance {
            return Ok(x);
        }
        if (value > 0.0) == lo_positive {
            lo = x;
        } else {
            hi = x;
        }
        let newton = x - value / slope;
        let next = if slope != 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        if (next - x).abs() <= opts.tolerance * (1.0 + x.abs()) {
            return Ok(next);
        }
        x = next;
    }
    Err(GrainError::RootFind(
        ErrorInfo::new("no_convergence", "intersection solver hit its iteration cap")
            .with_context("max_iters", opts.max_iters)
            .with_context("left_mean", left.mean)
            .with_context("right_mean", right.mean),
    ))
}

fn cdf(d: &Distribution, x: f64) -> f64 {
    match Normal::new(d.mean, d.std_dev) {
        Ok(normal) if d.std_dev > 0.0 => normal.cdf(x),
        _ => {
            if x >= d.mean {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Boundary between two adjacent classes with its misclassification masses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    /// Index of the finer class of the pair.
    pub left: usize,
    /// Boundary position.
    pub x: f64,
    /// Mass of the finer class above `x`.
    pub left_upper_tail: f64,
    /// Mass of the coarser class below `x`.
    pub right_lower_tail: f64,
    /// True when the solver failed and the midpoint of means was used.
    pub fallback: bool,
}

impl Intersection {
    /// Evaluates the tail masses of `left` and `right` at `x`.
    pub fn at(index: usize, left: &Distribution, right: &Distribution, x: f64, fallback: bool) -> Self {
        Self {
            left: index,
            x,
            left_upper_tail: 1.0 - cdf(left, x),
            right_lower_tail: cdf(right, x),
            fallback,
        }
    }
}
