#![deny(missing_docs)]
#![doc = "Run orchestration: segmentation seam, parallel per-image separation, calibration and reports."]

/// Calibration sample collection.
pub mod calibrate;
/// Plan and demo execution.
pub mod dispatch;
/// Calibration, separation and aggregation in one pass.
pub mod pipeline;
/// Plan loading.
pub mod plan;
/// Segmentation provider seam.
pub mod provider;
/// Report assembly and persistence.
pub mod report;
pub mod synth;
/// Per-image worker pool.
pub mod worker;

pub use calibrate::{CalibrationSet, MeasurementWindow};
pub use dispatch::{run_demo, run_plan, run_plan_from_path, DemoSpec};
pub use pipeline::{
    run_grading, CalibrationInput, GradingRun, SampleImages, SampleInput, SeparationTotals,
};
pub use plan::{load_plan, CalibrationSource, Plan, SampleSource};
pub use provider::{PrecomputedProvider, SegmentationProvider, SegmentedImage};
pub use report::{load_report, write_report, RunReport, REPORT_FILE};
pub use synth::{single_class_label, SyntheticProvider, SyntheticSpec};
pub use worker::{separate_images, ImageOutcome, ImageRecord, ImageState, WorkerOpts};
