//! YAML-configurable parameters threaded through every grading stage.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GrainError};
use crate::serde::from_yaml_slice;
use crate::types::{AcquisitionMode, GradingRange, CLASS_COUNT};

fn io_error(code: &str, err: impl ToString) -> GrainError {
    GrainError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// How grading ranges are obtained from the fitted distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BoundaryMode {
    /// Boundaries at adjacent Gaussian intersections.
    #[default]
    Intersection,
    /// `mean ± multiple · std_dev` per class.
    StdMultiple {
        /// Number of standard deviations on either side of the mean.
        multiple: f64,
    },
    /// Ranges supplied verbatim, one per class.
    Explicit {
        /// Explicit ranges ordered from finest to coarsest.
        ranges: Vec<GradingRange>,
    },
}

/// Mapping from image position to batch index within a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BatchScheme {
    /// Image `i` lands in batch `i mod batch_size`.
    #[default]
    Interleaved,
    /// Images `[k·B, (k+1)·B)` form batch `k`.
    Contiguous,
}

/// Method used to obtain the short and long axis of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AxisMethod {
    /// Minimum-area enclosing rectangle.
    #[default]
    MinAreaRect,
    /// Ellipse with the same second moments as the silhouette.
    MomentEllipse,
}

/// Constants relating wide-field measurements to narrow-field ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldLinkConstants {
    /// Area of one wide-field measurement unit in narrow-field units.
    pub area_ratio: f64,
    /// Orientation-averaged length ratio between the two fields.
    pub diameter_ratio: f64,
    /// Sampled area of the wide field over that of the narrow field.
    pub sampling_area_ratio: f64,
}

impl Default for FieldLinkConstants {
    fn default() -> Self {
        RigGeometry::default().physical_link_constants()
    }
}

/// Field of view of one camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    /// Field width in millimetres.
    pub width_mm: f64,
    /// Field height in millimetres.
    pub height_mm: f64,
    /// Sensor width in pixels.
    pub width_px: f64,
    /// Sensor height in pixels.
    pub height_px: f64,
}

impl FieldOfView {
    fn mm_per_px_x(&self) -> f64 {
        self.width_mm / self.width_px
    }

    fn mm_per_px_y(&self) -> f64 {
        self.height_mm / self.height_px
    }

    fn area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// Physical description of a dual-camera rig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigGeometry {
    /// Wide-field camera.
    pub wide: FieldOfView,
    /// Narrow-field camera.
    pub narrow: FieldOfView,
}

impl Default for RigGeometry {
    fn default() -> Self {
        Self {
            wide: FieldOfView {
                width_mm: 109.0,
                height_mm: 75.0,
                width_px: 3072.0,
                height_px: 2048.0,
            },
            narrow: FieldOfView {
                width_mm: 38.0,
                height_mm: 26.0,
                width_px: 5472.0,
                height_px: 3648.0,
            },
        }
    }
}

impl RigGeometry {
    fn axis_ratios(&self) -> (f64, f64) {
        (
            self.wide.mm_per_px_x() / self.narrow.mm_per_px_x(),
            self.wide.mm_per_px_y() / self.narrow.mm_per_px_y(),
        )
    }

    /// Narrow-field pixel area covered by one wide-field pixel.
    pub fn area_ratio(&self) -> f64 {
        let (kx, ky) = self.axis_ratios();
        kx * ky
    }

    /// Pixel length ratio averaged over orientations in one-degree steps.
    pub fn diameter_ratio(&self) -> f64 {
        let (kx, ky) = self.axis_ratios();
        let total: f64 = (0..180)
            .map(|deg| {
                let theta = (deg as f64).to_radians();
                ((kx * theta.cos()).powi(2) + (ky * theta.sin()).powi(2)).sqrt()
            })
            .sum();
        total / 180.0
    }

    /// Wide-field area over narrow-field area.
    pub fn sampling_area_ratio(&self) -> f64 {
        self.wide.area_mm2() / self.narrow.area_mm2()
    }

    /// Link constants for measurements kept in pixel units.
    pub fn pixel_link_constants(&self) -> FieldLinkConstants {
        FieldLinkConstants {
            area_ratio: self.area_ratio(),
            diameter_ratio: self.diameter_ratio(),
            sampling_area_ratio: self.sampling_area_ratio(),
        }
    }

    /// Link constants for measurements already converted to millimetres.
    pub fn physical_link_constants(&self) -> FieldLinkConstants {
        FieldLinkConstants {
            area_ratio: 1.0,
            diameter_ratio: 1.0,
            sampling_area_ratio: self.sampling_area_ratio(),
        }
    }
}

/// Convergence settings for the intersection solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootFindOptions {
    /// Iteration cap.
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
    /// Absolute tolerance on both the step and the residual.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_max_iters() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-10
}

impl Default for RootFindOptions {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            tolerance: default_tolerance(),
        }
    }
}

/// Immutable configuration of one grading run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Boundary derivation mode.
    #[serde(default)]
    pub grade_boundaries: BoundaryMode,
    /// Fraction of a class std-dev by which ranges are widened.
    #[serde(default)]
    pub extension_ratio: f64,
    /// Split touching particles instead of discarding them.
    #[serde(default = "default_true")]
    pub split_overlapping: bool,
    /// Substitute wide-field volumes for the two coarsest classes.
    #[serde(default)]
    pub link_wide_narrow_field: bool,
    /// Per-class multiplicative volume corrections.
    #[serde(default = "default_corrections")]
    pub volume_correction_factors: [f64; CLASS_COUNT],
    /// Millimetres per pixel for each acquisition mode.
    #[serde(default = "default_scales")]
    pub physical_scale_per_mode: BTreeMap<AcquisitionMode, f64>,
    /// Number of batches (interleaved) or images per batch (contiguous).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Batch assignment scheme.
    #[serde(default)]
    pub batch_scheme: BatchScheme,
    /// Smallest particle the optics resolve, in millimetres.
    #[serde(default = "default_min_detectable_size")]
    pub min_detectable_size: f64,
    /// Concavity angle thresholds in degrees for each acquisition mode.
    #[serde(default = "default_angle_thresholds")]
    pub angle_threshold_per_mode: BTreeMap<AcquisitionMode, f64>,
    /// Largest accepted long/short axis ratio.
    #[serde(default = "default_max_aspect_ratio")]
    pub max_aspect_ratio: f64,
    /// Recursion depth at which a polygon is accepted without further splitting.
    #[serde(default = "default_max_split_depth")]
    pub max_split_depth: usize,
    /// Classes taking part in labels and corrections.
    #[serde(default = "default_grade_enabled")]
    pub grade_enabled: [bool; CLASS_COUNT],
    /// Emit cumulative passing rates next to proportions.
    #[serde(default = "default_true")]
    pub passing_rate: bool,
    /// Axis measurement method.
    #[serde(default)]
    pub axis_method: AxisMethod,
    /// Acquisition mode whose images are graded.
    #[serde(default = "default_primary_mode")]
    pub primary_mode: AcquisitionMode,
    /// Dual-field link constants.
    #[serde(default)]
    pub field_link: FieldLinkConstants,
    /// Drop polygons touching the image border.
    #[serde(default = "default_true")]
    pub exclude_border: bool,
    /// Intersection solver settings.
    #[serde(default)]
    pub root_find: RootFindOptions,
}

fn default_true() -> bool {
    true
}

fn default_corrections() -> [f64; CLASS_COUNT] {
    [1.0; CLASS_COUNT]
}

fn default_scales() -> BTreeMap<AcquisitionMode, f64> {
    BTreeMap::from([
        (AcquisitionMode::Wide, 0.0351),
        (AcquisitionMode::Narrow, 0.00351),
    ])
}

fn default_batch_size() -> usize {
    1
}

fn default_min_detectable_size() -> f64 {
    0.075
}

fn default_angle_thresholds() -> BTreeMap<AcquisitionMode, f64> {
    BTreeMap::from([
        (AcquisitionMode::Wide, 130.0),
        (AcquisitionMode::Narrow, 110.0),
    ])
}

fn default_max_aspect_ratio() -> f64 {
    4.0
}

fn default_max_split_depth() -> usize {
    20
}

fn default_grade_enabled() -> [bool; CLASS_COUNT] {
    [true; CLASS_COUNT]
}

fn default_primary_mode() -> AcquisitionMode {
    AcquisitionMode::Narrow
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            grade_boundaries: BoundaryMode::default(),
            extension_ratio: 0.0,
            split_overlapping: true,
            link_wide_narrow_field: false,
            volume_correction_factors: default_corrections(),
            physical_scale_per_mode: default_scales(),
            batch_size: default_batch_size(),
            batch_scheme: BatchScheme::default(),
            min_detectable_size: default_min_detectable_size(),
            angle_threshold_per_mode: default_angle_thresholds(),
            max_aspect_ratio: default_max_aspect_ratio(),
            max_split_depth: default_max_split_depth(),
            grade_enabled: default_grade_enabled(),
            passing_rate: true,
            axis_method: AxisMethod::default(),
            primary_mode: default_primary_mode(),
            field_link: FieldLinkConstants::default(),
            exclude_border: true,
            root_find: RootFindOptions::default(),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl GradingConfig {
    /// Millimetres per pixel for `mode`.
    pub fn scale_for(&self, mode: AcquisitionMode) -> Result<f64, GrainError> {
        match self.physical_scale_per_mode.get(&mode) {
            Some(&scale) if positive(scale) => Ok(scale),
            Some(&scale) => Err(GrainError::Config(
                ErrorInfo::new("scale_invalid", "physical scale must be positive")
                    .with_context("mode", mode.as_str())
                    .with_context("scale", scale),
            )),
            None => Err(GrainError::Config(
                ErrorInfo::new("scale_missing", "no physical scale configured for mode")
                    .with_context("mode", mode.as_str())
                    .with_hint("add the mode to physical_scale_per_mode"),
            )),
        }
    }

    /// Concavity angle threshold in degrees for `mode`.
    pub fn angle_threshold_for(&self, mode: AcquisitionMode) -> Result<f64, GrainError> {
        match self.angle_threshold_per_mode.get(&mode) {
            Some(&angle) if angle > 0.0 && angle <= 180.0 => Ok(angle),
            Some(&angle) => Err(GrainError::Config(
                ErrorInfo::new("angle_invalid", "angle threshold must lie in (0, 180]")
                    .with_context("mode", mode.as_str())
                    .with_context("angle", angle),
            )),
            None => Err(GrainError::Config(
                ErrorInfo::new("angle_missing", "no angle threshold configured for mode")
                    .with_context("mode", mode.as_str()),
            )),
        }
    }

    /// Volume corrections with disabled classes zeroed.
    pub fn masked_corrections(&self) -> [f64; CLASS_COUNT] {
        let mut factors = self.volume_correction_factors;
        for (factor, enabled) in factors.iter_mut().zip(self.grade_enabled) {
            if !enabled {
                *factor = 0.0;
            }
        }
        factors
    }

    /// Rejects configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), GrainError> {
        if self.batch_size == 0 {
            return Err(GrainError::config(
                "batch_size_zero",
                "batch_size must be at least 1",
            ));
        }
        if !self.grade_enabled.iter().any(|enabled| *enabled) {
            return Err(GrainError::Config(
                ErrorInfo::new("no_classes", "every size class is disabled")
                    .with_hint("enable at least one entry of grade_enabled"),
            ));
        }
        if !self.extension_ratio.is_finite() || self.extension_ratio < 0.0 {
            return Err(GrainError::Config(
                ErrorInfo::new("extension_ratio_invalid", "extension_ratio must be >= 0")
                    .with_context("extension_ratio", self.extension_ratio),
            ));
        }
        if !self.min_detectable_size.is_finite() || self.min_detectable_size < 0.0 {
            return Err(GrainError::config(
                "min_size_invalid",
                "min_detectable_size must be >= 0",
            ));
        }
        if !self.max_aspect_ratio.is_finite() || self.max_aspect_ratio < 1.0 {
            return Err(GrainError::config(
                "aspect_ratio_invalid",
                "max_aspect_ratio must be >= 1",
            ));
        }
        if self
            .volume_correction_factors
            .iter()
            .any(|factor| !factor.is_finite() || *factor < 0.0)
        {
            return Err(GrainError::config(
                "correction_invalid",
                "volume corrections must be finite and non-negative",
            ));
        }
        match &self.grade_boundaries {
            BoundaryMode::Intersection => {}
            BoundaryMode::StdMultiple { multiple } if positive(*multiple) => {}
            BoundaryMode::StdMultiple { multiple } => {
                return Err(GrainError::Config(
                    ErrorInfo::new("multiple_invalid", "std multiple must be positive")
                        .with_context("multiple", multiple),
                ));
            }
            BoundaryMode::Explicit { ranges } if ranges.len() == CLASS_COUNT => {}
            BoundaryMode::Explicit { ranges } => {
                return Err(GrainError::Config(
                    ErrorInfo::new("explicit_ranges_len", "one explicit range per class")
                        .with_context("expected", CLASS_COUNT)
                        .with_context("found", ranges.len()),
                ));
            }
        }
        self.scale_for(self.primary_mode)?;
        self.angle_threshold_for(self.primary_mode)?;
        if self.link_wide_narrow_field {
            self.scale_for(AcquisitionMode::Wide)?;
            self.angle_threshold_for(AcquisitionMode::Wide)?;
            let link = self.field_link;
            if !(positive(link.area_ratio)
                && positive(link.diameter_ratio)
                && positive(link.sampling_area_ratio))
            {
                return Err(GrainError::config(
                    "field_link_invalid",
                    "field link constants must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Loads and validates a YAML configuration file.
pub fn load_config(path: &Path) -> Result<GradingConfig, GrainError> {
    let bytes = fs::read(path).map_err(|err| io_error("config_read", err))?;
    let config: GradingConfig = from_yaml_slice(&bytes)?;
    config.validate()?;
    Ok(config)
}
