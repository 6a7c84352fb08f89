#![deny(missing_docs)]
#![doc = "Grading aggregator: binning, normalization, fineness modulus and label comparison."]

/// Sample-level aggregation into grading tables.
pub mod aggregate;
/// Accumulators keyed by sample and batch.
pub mod accumulate;
/// Image to batch assignment.
pub mod batch;
/// Size class membership.
pub mod binning;
/// Label comparison.
pub mod compare;
/// Fineness modulus.
pub mod fineness;
/// Proportions and passing rates.
pub mod normalize;
/// Descriptive statistics.
pub mod stats;

pub use accumulate::{ClassTotals, GradeAccumulator};
pub use aggregate::{
    aggregate, BatchSummary, GradingReport, PassingRow, PassingRunSummary, PassingSummary,
    RunSummary, SampleBatchRow, SampleMeasurements, LINKED_CLASSES,
};
pub use batch::{batch_count, batch_index};
pub use binning::{classes_for, rescale_ranges};
pub use compare::{differences, summary_error};
pub use fineness::{fineness_modulus, FinenessPair};
pub use normalize::{count_proportions, mask_label, passing_rates, proportions};
pub use stats::{mean, percentile, rounded_mode, sample_variance, SummaryStats};
