use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use grain_core::config::{BoundaryMode, GradingConfig};
use grain_core::errors::{ErrorInfo, FailureTally, GrainError};
use grain_core::types::{ClassVector, GradingRange};
use grain_fit::{calibrate, check_monotonic, BoundaryReport};
use grain_grade::{aggregate, GradingReport, SampleMeasurements};
use grain_sep::RejectReason;

use crate::calibrate::{CalibrationSet, MeasurementWindow};
use crate::provider::SegmentationProvider;
use crate::worker::{separate_images, ImageOutcome, ImageRecord, ImageState, WorkerOpts};

/// Images of a single-class calibration sample.
pub struct CalibrationInput<'a> {
    /// Class every particle of the sample belongs to.
    pub class: usize,
    /// Window applied before fitting.
    pub window: MeasurementWindow,
    /// Image source.
    pub provider: &'a dyn SegmentationProvider,
}

/// Images of a sample to be graded.
pub struct SampleInput<'a> {
    /// Sample identifier.
    pub id: String,
    /// Reference proportions.
    pub label: ClassVector,
    /// Image source.
    pub provider: &'a dyn SegmentationProvider,
}

/// Separator counters summed over images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeparationTotals {
    /// Images offered by providers.
    pub images: usize,
    /// Images separated.
    pub completed: usize,
    /// Images that failed.
    pub failed: usize,
    /// Images skipped after cancellation.
    pub cancelled: usize,
    /// Candidate polygons.
    pub polygons: usize,
    /// Polygons dropped at the image border.
    pub border_excluded: u64,
    /// Accepted particles.
    pub accepted: usize,
    /// Rejections keyed by reason.
    pub rejections: BTreeMap<RejectReason, u64>,
    /// Cuts performed.
    pub splits: u64,
}

impl SeparationTotals {
    fn absorb(&mut self, record: &ImageRecord) {
        self.images += 1;
        match record.state {
            ImageState::Complete => self.completed += 1,
            ImageState::Failed => self.failed += 1,
            ImageState::Cancelled => self.cancelled += 1,
        }
        self.polygons += record.polygons;
        self.border_excluded += record.border_excluded;
        self.accepted += record.accepted;
        for (reason, count) in &record.rejections {
            *self.rejections.entry(*reason).or_insert(0) += count;
        }
        self.splits += record.splits;
    }
}

/// Per-image records of one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleImages {
    /// Sample identifier, or `class-N` for calibration samples.
    pub sample: String,
    /// Image records in acquisition order.
    pub images: Vec<ImageRecord>,
}

/// Result of a full grading run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRun {
    /// Calibration fit, absent when ranges were given explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<BoundaryReport>,
    /// Grading tables.
    pub grading: GradingReport,
    /// Image records per calibration and graded sample.
    pub images: Vec<SampleImages>,
    /// Separator counters over every image.
    pub separation: SeparationTotals,
    /// All isolated failures: separation, fitting and aggregation.
    pub failures: FailureTally,
    /// True when the run was cancelled before every image was processed.
    pub cancelled: bool,
}

struct Collected {
    images: Vec<SampleImages>,
    totals: SeparationTotals,
    failures: FailureTally,
}

impl Collected {
    fn new() -> Self {
        Self {
            images: Vec::new(),
            totals: SeparationTotals::default(),
            failures: FailureTally::new(),
        }
    }

    fn record(&mut self, sample: String, outcomes: &[ImageOutcome]) {
        let mut records = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            self.totals.absorb(&outcome.record);
            self.failures.merge(&outcome.failures);
            records.push(outcome.record.clone());
        }
        self.images.push(SampleImages {
            sample,
            images: records,
        });
    }
}

/// Separates calibration and sample images, derives grading ranges and aggregates.
///
/// Ranges come from the calibration fit when calibration samples are given,
/// otherwise from explicit ranges in `config`.
pub fn run_grading(
    calibration: &[CalibrationInput<'_>],
    samples: &[SampleInput<'_>],
    config: &GradingConfig,
    opts: &WorkerOpts,
    cancel: &AtomicBool,
) -> Result<GradingRun, GrainError> {
    config.validate()?;
    let mut collected = Collected::new();

    let boundaries = if calibration.is_empty() {
        None
    } else {
        let mut set = CalibrationSet::default();
        for input in calibration {
            let outcomes = separate_images(input.provider, config, opts, cancel)?;
            let primary = outcomes
                .iter()
                .filter(|o| o.is_complete() && o.record.mode == Some(config.primary_mode));
            set.extend(
                input.class,
                &input.window,
                primary.flat_map(|o| o.particles.iter()),
            );
            collected.record(format!("class-{}", input.class), &outcomes);
        }
        debug!(counts = ?set.counts(), windowed_out = set.windowed_out, "calibration set ready");
        Some(calibrate(&set.classes, config)?)
    };

    let ranges = resolve_ranges(boundaries.as_ref(), config)?;

    let mut measurements = Vec::with_capacity(samples.len());
    for input in samples {
        let outcomes = separate_images(input.provider, config, opts, cancel)?;
        let mut sample = SampleMeasurements::new(input.id.clone(), input.label);
        for outcome in outcomes.iter().filter(|o| o.is_complete()) {
            if outcome.record.mode == Some(config.primary_mode) {
                sample.images.push(outcome.particles.clone());
            } else if config.link_wide_narrow_field {
                sample.linked_images.push(outcome.particles.clone());
            }
        }
        info!(
            sample = %input.id,
            images = sample.images.len(),
            linked = sample.linked_images.len(),
            particles = sample.particle_count(),
            "sample separated"
        );
        collected.record(input.id.clone(), &outcomes);
        measurements.push(sample);
    }

    let grading = aggregate(&measurements, &ranges, config)?;
    let mut failures = collected.failures;
    if let Some(report) = &boundaries {
        failures.merge(&report.failures);
    }
    failures.merge(&grading.failures);

    let cancelled = cancel.load(Ordering::Relaxed);
    if cancelled {
        warn!(
            skipped = collected.totals.cancelled,
            "run cancelled, grading covers finished images only"
        );
    }
    Ok(GradingRun {
        boundaries,
        grading,
        images: collected.images,
        separation: collected.totals,
        failures,
        cancelled,
    })
}

fn resolve_ranges(
    boundaries: Option<&BoundaryReport>,
    config: &GradingConfig,
) -> Result<Vec<GradingRange>, GrainError> {
    match (boundaries, &config.grade_boundaries) {
        (Some(report), _) => Ok(report.ranges.clone()),
        (None, BoundaryMode::Explicit { ranges }) => {
            check_monotonic(ranges)?;
            Ok(ranges.clone())
        }
        (None, mode) => Err(GrainError::Config(
            ErrorInfo::new(
                "calibration_missing",
                "grading ranges need calibration samples unless given explicitly",
            )
            .with_context("mode", format!("{mode:?}")),
        )),
    }
}
