#![deny(missing_docs)]
#![doc = "Distribution fitter: per-class size distributions, Gaussian intersections and grading ranges."]

/// Boundary derivation for each configured mode.
pub mod boundaries;
/// Two-pass per-class fitting.
pub mod distribution;
/// Gaussian intersection root-finding.
pub mod gaussian;
/// Grading range construction.
pub mod ranges;

pub use boundaries::{adjacent_intersections, calibrate, derive_boundaries, BoundaryReport};
pub use distribution::{fit_class, fit_classes, mean_and_std, FitReport, TRIM_STD_MULTIPLE};
pub use gaussian::{intersect, peak_normalized_density, Intersection};
pub use ranges::{check_monotonic, ranges_from_boundaries, std_multiple_ranges};
