use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use grain_core::errors::{ErrorInfo, GrainError};
use grain_core::hash::round_to;
use grain_core::provenance::RunProvenance;
use grain_core::serde::{from_json_slice, to_canonical_json_bytes};

use crate::pipeline::GradingRun;

/// File name of the report inside an output directory.
pub const REPORT_FILE: &str = "grading_report.json";

fn io_error(code: &str, err: impl ToString) -> GrainError {
    GrainError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Grading run together with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Provenance metadata describing the run.
    pub provenance: RunProvenance,
    /// Run results.
    pub run: GradingRun,
}

impl RunReport {
    /// Stamps a run with provenance.
    pub fn new(run: GradingRun, input_hash: String, config_hash: String, seed: u64) -> Self {
        let provenance = RunProvenance::new(input_hash, config_hash, seed, Utc::now().to_rfc3339())
            .with_tool("grain-run", env!("CARGO_PKG_VERSION"));
        Self { provenance, run }
    }

    /// Key figures rounded to six decimals.
    pub fn headline(&self) -> BTreeMap<String, f64> {
        let summary = &self.run.grading.summary;
        let mut figures = BTreeMap::new();
        figures.insert("mean_error".to_string(), summary.error.mean);
        figures.insert("max_error".to_string(), summary.error.max);
        figures.insert("min_error".to_string(), summary.error.min);
        figures.insert("error_std_dev".to_string(), summary.error.std_dev);
        figures.insert("fineness_error_mean".to_string(), summary.fineness_error_mean);
        figures.insert("total_particles".to_string(), summary.total_particles as f64);
        figures.insert("failures".to_string(), self.run.failures.total() as f64);
        if let Some(passing) = &summary.passing {
            figures.insert("volume_passing_error_mean".to_string(), passing.volume_error_mean);
            figures.insert("count_passing_error_mean".to_string(), passing.count_error_mean);
        }
        figures
            .into_iter()
            .map(|(key, value)| (key, round_to(value, 6)))
            .collect()
    }
}

/// Writes the report as canonical JSON into `out` and returns its path.
pub fn write_report(report: &RunReport, out: &Path) -> Result<PathBuf, GrainError> {
    fs::create_dir_all(out).map_err(|err| io_error("report_out_dir", err))?;
    let path = out.join(REPORT_FILE);
    let bytes = to_canonical_json_bytes(report)?;
    fs::write(&path, bytes).map_err(|err| io_error("report_write", err))?;
    Ok(path)
}

/// Reads a report written by [`write_report`].
pub fn load_report(path: &Path) -> Result<RunReport, GrainError> {
    let bytes = fs::read(path).map_err(|err| io_error("report_read", err))?;
    from_json_slice(&bytes)
}
