use std::path::Path;
use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};
use tracing::info;

use grain_core::config::GradingConfig;
use grain_core::errors::GrainError;
use grain_core::hash::stable_hash_string;
use grain_core::types::{ClassVector, CLASS_COUNT};

use crate::calibrate::MeasurementWindow;
use crate::pipeline::{run_grading, CalibrationInput, SampleInput};
use crate::plan::{load_plan, Plan};
use crate::provider::PrecomputedProvider;
use crate::report::RunReport;
use crate::synth::{single_class_label, SyntheticProvider, SyntheticSpec};
use crate::worker::WorkerOpts;

/// Executes a plan whose segmented images live on disk.
pub fn run_plan(plan: &Plan, opts: &WorkerOpts, cancel: &AtomicBool) -> Result<RunReport, GrainError> {
    let calibration_providers = plan
        .calibration
        .iter()
        .map(|source| PrecomputedProvider::from_json_path(&plan.resolve(&source.segments)))
        .collect::<Result<Vec<_>, _>>()?;
    let sample_providers = plan
        .samples
        .iter()
        .map(|source| PrecomputedProvider::from_json_path(&plan.resolve(&source.segments)))
        .collect::<Result<Vec<_>, _>>()?;

    let calibration: Vec<CalibrationInput<'_>> = plan
        .calibration
        .iter()
        .zip(&calibration_providers)
        .map(|(source, provider)| CalibrationInput {
            class: source.class,
            window: source.window,
            provider,
        })
        .collect();
    let samples: Vec<SampleInput<'_>> = plan
        .samples
        .iter()
        .zip(&sample_providers)
        .map(|(source, provider)| SampleInput {
            id: source.id.clone(),
            label: source.label,
            provider,
        })
        .collect();

    info!(
        calibration = calibration.len(),
        samples = samples.len(),
        concurrency = opts.concurrency,
        "running plan"
    );
    let run = run_grading(&calibration, &samples, &plan.config, opts, cancel)?;
    Ok(RunReport::new(
        run,
        plan.plan_hash()?,
        stable_hash_string(&plan.config)?,
        0,
    ))
}

/// Loads a plan from disk and executes it with the plan's own concurrency.
pub fn run_plan_from_path(plan_path: &Path, cancel: &AtomicBool) -> Result<RunReport, GrainError> {
    let plan = load_plan(plan_path)?;
    let opts = WorkerOpts {
        concurrency: plan.concurrency,
    };
    run_plan(&plan, &opts, cancel)
}

/// Synthetic end-to-end run: single-class calibration plus graded mixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSpec {
    /// Acquisition parameters shared by every synthetic sample.
    #[serde(default)]
    pub synthetic: SyntheticSpec,
    /// Labels of the mixtures to grade.
    #[serde(default = "DemoSpec::default_labels")]
    pub labels: Vec<ClassVector>,
}

impl DemoSpec {
    fn default_labels() -> Vec<ClassVector> {
        vec![
            [0.05, 0.1, 0.2, 0.3, 0.25, 0.1],
            [0.0, 0.0, 0.2, 0.3, 0.3, 0.2],
        ]
    }
}

impl Default for DemoSpec {
    fn default() -> Self {
        Self {
            synthetic: SyntheticSpec::default(),
            labels: Self::default_labels(),
        }
    }
}

/// Runs the synthetic demo.
pub fn run_demo(
    demo: &DemoSpec,
    config: &GradingConfig,
    opts: &WorkerOpts,
    cancel: &AtomicBool,
) -> Result<RunReport, GrainError> {
    let calibration_providers: Vec<SyntheticProvider> = (0..CLASS_COUNT)
        .map(|class| {
            SyntheticProvider::new(demo.synthetic.clone(), &single_class_label(class), class as u64)
        })
        .collect();
    let sample_providers: Vec<SyntheticProvider> = demo
        .labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            SyntheticProvider::new(demo.synthetic.clone(), label, (CLASS_COUNT + idx) as u64)
        })
        .collect();

    let calibration: Vec<CalibrationInput<'_>> = calibration_providers
        .iter()
        .enumerate()
        .map(|(class, provider)| CalibrationInput {
            class,
            window: MeasurementWindow::default(),
            provider,
        })
        .collect();
    let samples: Vec<SampleInput<'_>> = demo
        .labels
        .iter()
        .zip(&sample_providers)
        .enumerate()
        .map(|(idx, (label, provider))| SampleInput {
            id: format!("mixture-{idx}"),
            label: *label,
            provider,
        })
        .collect();

    let run = run_grading(&calibration, &samples, config, opts, cancel)?;
    Ok(RunReport::new(
        run,
        stable_hash_string(demo)?,
        stable_hash_string(config)?,
        demo.synthetic.seed,
    ))
}
