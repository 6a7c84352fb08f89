use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Args;
use grain_run::{run_demo, write_report, DemoSpec, SyntheticSpec, WorkerOpts};
use tracing::info;

use super::{config_or_default, emit_json};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Seed for the synthetic silhouettes.
    #[arg(long, default_value_t = 2024)]
    pub seed: u64,
    /// Images per calibration class and per mixture.
    #[arg(long, default_value_t = 6)]
    pub images: usize,
    /// Particles per image.
    #[arg(long, default_value_t = 40)]
    pub particles: usize,
    /// Worker threads.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
    /// Optional YAML grading configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory for the full report; only the headline is printed otherwise.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let config = config_or_default(args.config.as_ref())?;
    let demo = DemoSpec {
        synthetic: SyntheticSpec {
            seed: args.seed,
            images: args.images,
            particles_per_image: args.particles,
            mode: config.primary_mode,
            scale: config.scale_for(config.primary_mode)?,
            ..SyntheticSpec::default()
        },
        ..DemoSpec::default()
    };
    let cancel = AtomicBool::new(false);
    let report = run_demo(
        &demo,
        &config,
        &WorkerOpts {
            concurrency: args.jobs,
        },
        &cancel,
    )?;
    if let Some(out) = &args.out {
        let path = write_report(&report, out)?;
        info!(report = %path.display(), "demo report written");
    }
    emit_json(&report.headline(), None)
}
