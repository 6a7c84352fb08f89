use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use clap::Args;
use grain_run::{load_plan, run_plan, write_report, WorkerOpts};
use tracing::info;

use super::emit_json;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML plan listing calibration and sample segment files.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory for the grading report.
    #[arg(long)]
    pub out: PathBuf,
    /// Worker threads; defaults to the plan's concurrency.
    #[arg(long)]
    pub jobs: Option<usize>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let opts = WorkerOpts {
        concurrency: args.jobs.unwrap_or(plan.concurrency),
    };
    let cancel = AtomicBool::new(false);
    let report = run_plan(&plan, &opts, &cancel)?;
    let path = write_report(&report, &args.out)?;
    info!(report = %path.display(), "grading report written");
    emit_json(&report.headline(), None)
}
