use std::error::Error;

use clap::{Parser, Subcommand};

use commands::{
    demo::{self, DemoArgs},
    fit::{self, FitArgs},
    run::{self, RunArgs},
    separate::{self, SeparateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "grain", about = "Sand particle grading from segmented silhouettes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a grading plan and write the report.
    Run(RunArgs),
    /// Fit class distributions and derive grading ranges from calibration measurements.
    Fit(FitArgs),
    /// Separate segmented images into accepted particle measurements.
    Separate(SeparateArgs),
    /// Run a deterministic synthetic calibration and grading end to end.
    Demo(DemoArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Fit(args) => fit::run(&args),
        Command::Separate(args) => separate::run(&args),
        Command::Demo(args) => demo::run(&args),
    }
}
