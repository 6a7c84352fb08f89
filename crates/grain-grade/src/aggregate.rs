use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use grain_core::config::GradingConfig;
use grain_core::errors::{ErrorInfo, FailureKind, FailureTally, GrainError};
use grain_core::types::{
    AcquisitionMode, ClassVector, GradingRange, ParticleMeasurement, CLASS_COUNT,
};

use crate::accumulate::{ClassTotals, GradeAccumulator};
use crate::batch::{batch_count, batch_index};
use crate::binning::rescale_ranges;
use crate::compare::{differences, summary_error};
use crate::fineness::FinenessPair;
use crate::normalize::{count_proportions, mask_label, passing_rates, proportions};
use crate::stats::{mean, sample_variance, SummaryStats};

/// Classes whose primary-view volumes are replaced by linked-view values.
pub const LINKED_CLASSES: std::ops::Range<usize> = CLASS_COUNT - 2..CLASS_COUNT;

/// Accepted particles of one sample, grouped per image in acquisition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMeasurements {
    /// Sample identifier.
    pub id: String,
    /// Reference proportions from sieve analysis, finest class first.
    pub label: ClassVector,
    /// Particles per image from the primary (measuring) view.
    pub images: Vec<Vec<ParticleMeasurement>>,
    /// Particles per image from the other view, used by the dual-field link.
    #[serde(default)]
    pub linked_images: Vec<Vec<ParticleMeasurement>>,
}

impl SampleMeasurements {
    /// Creates a sample without linked-view images.
    pub fn new(id: impl Into<String>, label: ClassVector) -> Self {
        Self {
            id: id.into(),
            label,
            images: Vec::new(),
            linked_images: Vec::new(),
        }
    }

    /// Total number of primary-view particles.
    pub fn particle_count(&self) -> usize {
        self.images.iter().map(Vec::len).sum()
    }
}

/// Percent-passing comparison of one sample batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassingRow {
    /// Cumulative label fractions.
    pub label: ClassVector,
    /// Cumulative particle-count fractions.
    pub count: ClassVector,
    /// Cumulative volume fractions.
    pub volume: ClassVector,
    /// `label − count` per class.
    pub count_differences: ClassVector,
    /// `label − volume` per class.
    pub volume_differences: ClassVector,
    /// Sum of absolute count-passing differences.
    pub count_error: f64,
    /// Sum of absolute volume-passing differences.
    pub volume_error: f64,
}

impl PassingRow {
    fn new(label: &ClassVector, totals: &ClassTotals) -> Self {
        let label = passing_rates(label);
        let count = passing_rates(&totals.count.map(|c| c as f64));
        let volume = passing_rates(&totals.volume);
        let count_differences = differences(&label, &count);
        let volume_differences = differences(&label, &volume);
        Self {
            label,
            count,
            volume,
            count_error: summary_error(&count_differences),
            volume_error: summary_error(&volume_differences),
            count_differences,
            volume_differences,
        }
    }
}

/// Grading result of one (sample, batch) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatchRow {
    /// Sample identifier.
    pub sample: String,
    /// Batch index within the sample, 0-based.
    pub batch: usize,
    /// Reference proportions after masking disabled classes.
    pub label: ClassVector,
    /// Corrected class volumes.
    pub volume: ClassVector,
    /// Volume share per class.
    pub volume_proportion: ClassVector,
    /// Count share per class.
    pub count_proportion: ClassVector,
    /// Particle count per class.
    pub counts: [u64; CLASS_COUNT],
    /// `label − volume_proportion`.
    pub differences: ClassVector,
    /// Sum of absolute differences.
    pub summary_error: f64,
    /// Measured and reference fineness modulus.
    pub fineness: FinenessPair,
    /// Percent-passing comparison, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing: Option<PassingRow>,
}

/// Cross-sample passing statistics of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassingSummary {
    /// Mean cumulative count fractions.
    pub count_rate_mean: ClassVector,
    /// Mean cumulative volume fractions.
    pub volume_rate_mean: ClassVector,
    /// Mean count-passing error.
    pub count_error_mean: f64,
    /// Sample variance of the count-passing error.
    pub count_error_variance: f64,
    /// Mean volume-passing error.
    pub volume_error_mean: f64,
    /// Sample variance of the volume-passing error.
    pub volume_error_variance: f64,
}

/// Cross-sample summary of one batch index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Batch index.
    pub batch: usize,
    /// Samples contributing a row.
    pub samples: usize,
    /// Mean summary error.
    pub mean_error: f64,
    /// Sample variance of the summary error.
    pub error_variance: f64,
    /// Particle counts per class summed over samples.
    pub counts: [u64; CLASS_COUNT],
    /// Mean measured fineness modulus.
    pub fineness_measured_mean: f64,
    /// Mean reference fineness modulus.
    pub fineness_label_mean: f64,
    /// Mean fineness-modulus error.
    pub fineness_error_mean: f64,
    /// Sample variance of the fineness-modulus error.
    pub fineness_error_variance: f64,
    /// Passing statistics, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing: Option<PassingSummary>,
}

/// Run-level passing statistics over per-batch means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassingRunSummary {
    /// Mean of per-batch mean count-passing errors.
    pub count_error_mean: f64,
    /// Variance of per-batch mean count-passing errors.
    pub count_error_variance: f64,
    /// Mean of per-batch mean volume-passing errors.
    pub volume_error_mean: f64,
    /// Variance of per-batch mean volume-passing errors.
    pub volume_error_variance: f64,
}

/// Run-level statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Statistics of the per-batch mean summary errors.
    pub error: SummaryStats,
    /// Binned particle increments over every row.
    pub total_particles: u64,
    /// Mean measured fineness modulus over every row.
    pub fineness_measured_mean: f64,
    /// Mean reference fineness modulus over every row.
    pub fineness_label_mean: f64,
    /// Mean fineness-modulus error over every row.
    pub fineness_error_mean: f64,
    /// Sample variance of the fineness-modulus error over every row.
    pub fineness_error_variance: f64,
    /// Passing statistics, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passing: Option<PassingRunSummary>,
}

/// Complete output of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    /// Ranges the particles were binned with.
    pub ranges: Vec<GradingRange>,
    /// One row per (sample, batch).
    pub rows: Vec<SampleBatchRow>,
    /// One summary per batch index.
    pub batches: Vec<BatchSummary>,
    /// Run-level statistics.
    pub summary: RunSummary,
    /// Empty batches and other isolated failures.
    pub failures: FailureTally,
}

/// Bins, normalizes and compares every sample against its label.
///
/// Fails only on systemic misconfiguration; empty batches are reported as
/// zero proportions and counted as [`FailureKind::EmptyClass`].
pub fn aggregate(
    samples: &[SampleMeasurements],
    ranges: &[GradingRange],
    config: &GradingConfig,
) -> Result<GradingReport, GrainError> {
    config.validate()?;
    if samples.is_empty() {
        return Err(GrainError::config("no_samples", "nothing to aggregate"));
    }
    if ranges.len() != CLASS_COUNT {
        return Err(GrainError::Config(
            ErrorInfo::new("range_count", "one grading range per class is required")
                .with_context("expected", CLASS_COUNT)
                .with_context("found", ranges.len()),
        ));
    }
    if config.link_wide_narrow_field && config.primary_mode != AcquisitionMode::Narrow {
        return Err(GrainError::Config(
            ErrorInfo::new(
                "link_primary_mode",
                "the dual-field link substitutes wide-field volumes into a narrow-field grading",
            )
            .with_hint("set primary_mode to narrow or disable link_wide_narrow_field"),
        ));
    }

    let corrections = config.masked_corrections();
    let link = config.link_wide_narrow_field.then_some(config.field_link);
    let linked_ranges = link.map(|constants| rescale_ranges(ranges, constants.diameter_ratio));

    let mut primary = GradeAccumulator::new();
    let mut linked = GradeAccumulator::new();
    let mut failures = FailureTally::new();
    let mut rows = Vec::new();

    for (sample_idx, sample) in samples.iter().enumerate() {
        let image_count = if link.is_some() {
            sample.images.len().max(sample.linked_images.len())
        } else {
            sample.images.len()
        };
        let batches = batch_count(image_count, config.batch_size, config.batch_scheme);
        for batch in 0..batches {
            primary.touch(sample_idx, batch);
        }
        for (image_idx, particles) in sample.images.iter().enumerate() {
            let batch = batch_index(image_idx, config.batch_size, config.batch_scheme);
            for particle in particles {
                primary.add_particle(sample_idx, batch, particle, ranges);
            }
        }
        if let Some(linked_ranges) = &linked_ranges {
            for (image_idx, particles) in sample.linked_images.iter().enumerate() {
                let batch = batch_index(image_idx, config.batch_size, config.batch_scheme);
                for particle in particles {
                    linked.add_particle(sample_idx, batch, particle, linked_ranges);
                }
            }
        }

        let label = mask_label(&sample.label, &config.grade_enabled);
        for batch in primary.batches(sample_idx) {
            let mut totals = primary.totals(sample_idx, batch);
            if let Some(constants) = link {
                let wide = linked.totals(sample_idx, batch);
                let factor = constants.diameter_ratio * constants.area_ratio
                    / constants.sampling_area_ratio;
                for class in LINKED_CLASSES {
                    totals.volume[class] = wide.volume[class] * factor;
                }
            }
            for (volume, correction) in totals.volume.iter_mut().zip(corrections) {
                *volume *= correction;
            }
            if totals.total_volume() <= 0.0 {
                warn!(sample = %sample.id, batch, "batch holds no particle volume");
                failures.record(FailureKind::EmptyClass);
            }
            rows.push(build_row(&sample.id, batch, label, &totals, config.passing_rate));
        }
        debug!(
            sample = %sample.id,
            images = sample.images.len(),
            particles = sample.particle_count(),
            "sample aggregated"
        );
    }

    let batches = summarize_batches(&rows);
    let summary = summarize_run(&rows, &batches, config.passing_rate);
    info!(
        samples = samples.len(),
        rows = rows.len(),
        mean_error = summary.error.mean,
        "aggregation complete"
    );
    Ok(GradingReport {
        ranges: ranges.to_vec(),
        rows,
        batches,
        summary,
        failures,
    })
}

fn build_row(
    sample: &str,
    batch: usize,
    label: ClassVector,
    totals: &ClassTotals,
    passing: bool,
) -> SampleBatchRow {
    let volume_proportion = proportions(&totals.volume);
    let diffs = differences(&label, &volume_proportion);
    SampleBatchRow {
        sample: sample.to_string(),
        batch,
        label,
        volume: totals.volume,
        volume_proportion,
        count_proportion: count_proportions(&totals.count),
        counts: totals.count,
        summary_error: summary_error(&diffs),
        differences: diffs,
        fineness: FinenessPair::new(&volume_proportion, &label),
        passing: passing.then(|| PassingRow::new(&label, totals)),
    }
}

fn summarize_batches(rows: &[SampleBatchRow]) -> Vec<BatchSummary> {
    let mut grouped: BTreeMap<usize, Vec<&SampleBatchRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.batch).or_default().push(row);
    }
    grouped
        .into_iter()
        .map(|(batch, rows)| {
            let errors: Vec<f64> = rows.iter().map(|r| r.summary_error).collect();
            let fm_errors: Vec<f64> = rows.iter().map(|r| r.fineness.error()).collect();
            let mut counts = [0u64; CLASS_COUNT];
            for row in &rows {
                for (total, count) in counts.iter_mut().zip(row.counts) {
                    *total += count;
                }
            }
            let passing: Vec<&PassingRow> = rows.iter().filter_map(|r| r.passing.as_ref()).collect();
            BatchSummary {
                batch,
                samples: rows.len(),
                mean_error: mean(&errors),
                error_variance: sample_variance(&errors),
                counts,
                fineness_measured_mean: mean(&rows.iter().map(|r| r.fineness.measured).collect::<Vec<_>>()),
                fineness_label_mean: mean(&rows.iter().map(|r| r.fineness.label).collect::<Vec<_>>()),
                fineness_error_mean: mean(&fm_errors),
                fineness_error_variance: sample_variance(&fm_errors),
                passing: (!passing.is_empty()).then(|| summarize_passing(&passing)),
            }
        })
        .collect()
}

fn summarize_passing(rows: &[&PassingRow]) -> PassingSummary {
    let mut count_rate_mean = [0.0; CLASS_COUNT];
    let mut volume_rate_mean = [0.0; CLASS_COUNT];
    for row in rows {
        for class in 0..CLASS_COUNT {
            count_rate_mean[class] += row.count[class] / rows.len() as f64;
            volume_rate_mean[class] += row.volume[class] / rows.len() as f64;
        }
    }
    let count_errors: Vec<f64> = rows.iter().map(|r| r.count_error).collect();
    let volume_errors: Vec<f64> = rows.iter().map(|r| r.volume_error).collect();
    PassingSummary {
        count_rate_mean,
        volume_rate_mean,
        count_error_mean: mean(&count_errors),
        count_error_variance: sample_variance(&count_errors),
        volume_error_mean: mean(&volume_errors),
        volume_error_variance: sample_variance(&volume_errors),
    }
}

fn summarize_run(rows: &[SampleBatchRow], batches: &[BatchSummary], passing: bool) -> RunSummary {
    let batch_errors: Vec<f64> = batches.iter().map(|b| b.mean_error).collect();
    let fm_errors: Vec<f64> = rows.iter().map(|r| r.fineness.error()).collect();
    let passing = passing.then(|| {
        let count: Vec<f64> = batches
            .iter()
            .filter_map(|b| b.passing.map(|p| p.count_error_mean))
            .collect();
        let volume: Vec<f64> = batches
            .iter()
            .filter_map(|b| b.passing.map(|p| p.volume_error_mean))
            .collect();
        PassingRunSummary {
            count_error_mean: mean(&count),
            count_error_variance: sample_variance(&count),
            volume_error_mean: mean(&volume),
            volume_error_variance: sample_variance(&volume),
        }
    });
    RunSummary {
        error: SummaryStats::from_values(&batch_errors),
        total_particles: rows.iter().map(|r| r.counts.iter().sum::<u64>()).sum(),
        fineness_measured_mean: mean(&rows.iter().map(|r| r.fineness.measured).collect::<Vec<_>>()),
        fineness_label_mean: mean(&rows.iter().map(|r| r.fineness.label).collect::<Vec<_>>()),
        fineness_error_mean: mean(&fm_errors),
        fineness_error_variance: sample_variance(&fm_errors),
        passing,
    }
}
