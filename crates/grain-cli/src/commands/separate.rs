use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Args;
use grain_core::errors::FailureTally;
use grain_core::types::ParticleMeasurement;
use grain_run::{separate_images, ImageRecord, PrecomputedProvider, WorkerOpts};
use serde::Serialize;

use super::{config_or_default, emit_json};

#[derive(Args, Debug)]
pub struct SeparateArgs {
    /// JSON array of segmented images.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Optional YAML grading configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Worker threads.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
    /// Output file; prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SeparatedImage {
    record: ImageRecord,
    particles: Vec<ParticleMeasurement>,
}

#[derive(Debug, Serialize)]
struct SeparateReport {
    images: Vec<SeparatedImage>,
    failures: FailureTally,
}

pub fn run(args: &SeparateArgs) -> Result<(), Box<dyn Error>> {
    let config = config_or_default(args.config.as_ref())?;
    let provider = PrecomputedProvider::from_json_path(&args.input)?;
    let cancel = AtomicBool::new(false);
    let outcomes = separate_images(
        &provider,
        &config,
        &WorkerOpts {
            concurrency: args.jobs,
        },
        &cancel,
    )?;
    let mut failures = FailureTally::new();
    let images = outcomes
        .into_iter()
        .map(|outcome| {
            failures.merge(&outcome.failures);
            SeparatedImage {
                record: outcome.record,
                particles: outcome.particles,
            }
        })
        .collect();
    emit_json(&SeparateReport { images, failures }, args.out.as_deref())
}
