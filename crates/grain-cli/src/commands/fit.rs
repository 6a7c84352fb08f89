use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use grain_core::serde::from_json_slice;
use grain_fit::calibrate;

use super::{config_or_default, emit_json};

#[derive(Args, Debug)]
pub struct FitArgs {
    /// JSON array holding one array of short-axis lengths (mm) per class.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Optional YAML grading configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output file; prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &FitArgs) -> Result<(), Box<dyn Error>> {
    let config = config_or_default(args.config.as_ref())?;
    let classes: Vec<Vec<f64>> = from_json_slice(&fs::read(&args.input)?)?;
    let report = calibrate(&classes, &config)?;
    emit_json(&report, args.out.as_deref())
}
