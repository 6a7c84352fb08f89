use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use grain_core::config::GradingConfig;
use grain_core::errors::{ErrorInfo, FailureKind, FailureTally, GrainError};
use grain_core::types::{AcquisitionMode, ParticleMeasurement};
use grain_geom::touches_border;
use grain_sep::{RejectReason, Separator, SeparatorSettings};

use crate::provider::SegmentationProvider;

/// Options governing per-image execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerOpts {
    /// Number of images processed in parallel.
    pub concurrency: usize,
}

impl Default for WorkerOpts {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// State of one image task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageState {
    /// Separated successfully.
    Complete,
    /// Segmentation or separator setup failed; the image contributes nothing.
    Failed,
    /// Skipped because the run was cancelled before the task started.
    Cancelled,
}

/// Report entry for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Position in the provider's acquisition order.
    pub index: usize,
    /// Image identifier, empty when segmentation never produced one.
    pub id: String,
    /// Acquisition view, absent when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AcquisitionMode>,
    /// Task state.
    pub state: ImageState,
    /// Error message for failed images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Candidate polygons received from segmentation.
    pub polygons: usize,
    /// Polygons dropped for touching the image border.
    pub border_excluded: u64,
    /// Accepted particles.
    pub accepted: usize,
    /// Rejected polygons keyed by reason.
    pub rejections: BTreeMap<RejectReason, u64>,
    /// Cuts performed.
    pub splits: u64,
}

impl ImageRecord {
    fn pending(index: usize, state: ImageState) -> Self {
        Self {
            index,
            id: String::new(),
            mode: None,
            state,
            error: None,
            polygons: 0,
            border_excluded: 0,
            accepted: 0,
            rejections: BTreeMap::new(),
            splits: 0,
        }
    }
}

/// Everything one image task produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOutcome {
    /// Summary entry.
    pub record: ImageRecord,
    /// Measurements of accepted particles.
    pub particles: Vec<ParticleMeasurement>,
    /// Isolated failures met while processing the image.
    pub failures: FailureTally,
}

impl ImageOutcome {
    fn cancelled(index: usize) -> Self {
        Self {
            record: ImageRecord::pending(index, ImageState::Cancelled),
            particles: Vec::new(),
            failures: FailureTally::new(),
        }
    }

    fn failed(index: usize, id: String, mode: Option<AcquisitionMode>, err: &GrainError) -> Self {
        let mut record = ImageRecord::pending(index, ImageState::Failed);
        record.id = id;
        record.mode = mode;
        record.error = Some(err.to_string());
        let mut failures = FailureTally::new();
        failures.record(FailureKind::ImageFailed);
        Self {
            record,
            particles: Vec::new(),
            failures,
        }
    }

    /// Returns true when the image was separated.
    pub fn is_complete(&self) -> bool {
        self.record.state == ImageState::Complete
    }
}

/// Separates every image of `provider`, one pool task per image.
///
/// Results come back in acquisition order. Images not yet started when
/// `cancel` is raised are reported as cancelled; finished ones are kept.
pub fn separate_images<P>(
    provider: &P,
    config: &GradingConfig,
    opts: &WorkerOpts,
    cancel: &AtomicBool,
) -> Result<Vec<ImageOutcome>, GrainError>
where
    P: SegmentationProvider + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.concurrency.max(1))
        .build()
        .map_err(|err| GrainError::Config(ErrorInfo::new("thread_pool", err.to_string())))?;

    let mut ordered: Vec<(usize, ImageOutcome)> = pool.install(|| {
        (0..provider.image_count())
            .into_par_iter()
            .map(|index| {
                if cancel.load(Ordering::Relaxed) {
                    return (index, ImageOutcome::cancelled(index));
                }
                (index, process_image(provider, index, config))
            })
            .collect()
    });
    ordered.sort_by_key(|(index, _)| *index);
    Ok(ordered.into_iter().map(|(_, outcome)| outcome).collect())
}

fn process_image<P>(provider: &P, index: usize, config: &GradingConfig) -> ImageOutcome
where
    P: SegmentationProvider + ?Sized,
{
    let image = match provider.segment(index) {
        Ok(image) => image,
        Err(err) => {
            warn!(index, error = %err, "segmentation failed");
            return ImageOutcome::failed(index, String::new(), None, &err);
        }
    };
    let settings = match SeparatorSettings::from_config(config, image.mode) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(index, id = %image.id, error = %err, "no separator settings for image mode");
            return ImageOutcome::failed(index, image.id, Some(image.mode), &err);
        }
    };
    let separator = Separator::new(settings);

    let mut border_excluded = 0u64;
    let kept: Vec<_> = image
        .polygons
        .iter()
        .filter(|polygon| {
            let touching =
                config.exclude_border && touches_border(polygon, image.width, image.height);
            if touching {
                border_excluded += 1;
            }
            !touching
        })
        .collect();
    let outcome = separator.separate_all(kept);
    debug!(
        index,
        id = %image.id,
        polygons = image.polygons.len(),
        accepted = outcome.accepted.len(),
        splits = outcome.splits,
        border_excluded,
        "image separated"
    );

    ImageOutcome {
        particles: outcome.measurements(),
        record: ImageRecord {
            index,
            id: image.id,
            mode: Some(image.mode),
            state: ImageState::Complete,
            error: None,
            polygons: image.polygons.len(),
            border_excluded,
            accepted: outcome.accepted.len(),
            rejections: outcome.rejections,
            splits: outcome.splits,
        },
        failures: outcome.failures,
    }
}
