//! Food Desert - command-line entry point
//!
//! Runs one pipeline stage, or all of them in order, against the data
//! layout described by the config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use food_desert::core::config::PipelineConfig;
use food_desert::core::error::Result;
use food_desert::pipeline::{self, StageReport};

#[derive(Parser, Debug)]
#[command(name = "food_desert")]
#[command(about = "Allocate census population to parcels and measure grocery access")]
struct Args {
    /// Pipeline config (TOML); defaults are used when the file is missing
    #[arg(long, default_value = "food_desert.toml")]
    config: PathBuf,

    /// Debug-level logging
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    stage: Stage,
}

#[derive(Subcommand, Debug)]
enum Stage {
    /// Parcel to neighbourhood mask
    Join,
    /// Residents per parcel mask
    Allocate,
    /// Nearest audited facility per parcel mask
    Proximity,
    /// Parcel outcomes, co-located groups and the food-desert summary
    Report,
    /// Every stage in order
    Run,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "food_desert=debug"
    } else {
        "food_desert=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = PipelineConfig::load(&args.config)?;

    let reports: Vec<StageReport> = match args.stage {
        Stage::Join => vec![pipeline::stage_join(&config)?],
        Stage::Allocate => vec![pipeline::stage_allocate(&config)?],
        Stage::Proximity => vec![pipeline::stage_proximity(&config)?],
        Stage::Report => {
            let (report, summary) = pipeline::stage_report(&config)?;
            println!("{}", summary.summary());
            vec![report]
        }
        Stage::Run => {
            let (reports, summary) = pipeline::run_all(&config)?;
            println!("{}", summary.summary());
            reports
        }
    };

    for report in &reports {
        println!("{}", report.summary());
    }
    Ok(())
}
