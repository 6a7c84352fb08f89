use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use grain_core::config::GradingConfig;
use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::hash::stable_hash_string;
use grain_core::serde::{from_yaml_slice, to_yaml_string};
use grain_core::types::ClassVector;

use crate::calibrate::MeasurementWindow;

fn io_error(code: &str, err: impl ToString) -> GrainError {
    GrainError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Single-class calibration sample on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSource {
    /// Class index, finest first.
    pub class: usize,
    /// JSON file holding the segmented images.
    pub segments: PathBuf,
    /// Measurement window applied before fitting.
    #[serde(default)]
    pub window: MeasurementWindow,
}

/// Graded sample on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSource {
    /// Sample identifier.
    pub id: String,
    /// Reference proportions from sieve analysis.
    pub label: ClassVector,
    /// JSON file holding the segmented images, both views mixed.
    pub segments: PathBuf,
}

/// Grading run description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Grading configuration.
    #[serde(default)]
    pub config: GradingConfig,
    /// Worker threads used for per-image separation.
    #[serde(default = "Plan::default_concurrency")]
    pub concurrency: usize,
    /// Calibration samples; may be empty when ranges are explicit.
    #[serde(default)]
    pub calibration: Vec<CalibrationSource>,
    /// Samples to grade.
    pub samples: Vec<SampleSource>,
    /// Directory containing the plan on disk (ignored when serializing).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Plan {
    fn default_concurrency() -> usize {
        1
    }

    /// Deterministic hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, GrainError> {
        stable_hash_string(self)
    }

    /// Canonical YAML representation.
    pub fn to_yaml_string(&self) -> Result<String, GrainError> {
        to_yaml_string(self)
    }

    /// Resolves a plan-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Loads a plan, validating its configuration and ordering calibration by class.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan, GrainError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| io_error("plan_read", err))?;
    let mut plan: Plan = from_yaml_slice(&bytes)?;
    plan.config.validate()?;
    if plan.samples.is_empty() {
        return Err(GrainError::config("no_samples", "the plan lists no samples"));
    }
    plan.calibration.sort_by_key(|source| source.class);
    plan.base_dir = plan_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(plan)
}
