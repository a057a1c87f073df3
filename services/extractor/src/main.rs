//! Point time series extractor.
//!
//! Reads a run-control JSON file and extracts the model time series at each
//! station, writing CSV files (`csv`) or printing the matrix (`var`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use extractor::{execute, format_matrix, OutputFormat, RunControl, RunOptions};
use netcdf_parser::NetCdfSourceConfig;
use point_extractor::ExtractorConfig;

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Extract point time series from ParFlow/CLM netCDF output")]
struct Args {
    /// Run-control JSON file
    run_control: PathBuf,

    /// Output format
    #[arg(value_enum)]
    format: OutputFormat,

    /// Directory for CSV files (overrides OutputDir in the run control)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Earth radius for great-circle distances, in km
    #[arg(long, env = "EARTH_RADIUS_KM")]
    earth_radius_km: Option<f64>,

    /// Maximum number of alternative locations suggested for water cells
    #[arg(long, env = "MAX_ALTERNATIVES")]
    max_alternatives: Option<usize>,

    /// Level index of the indicator slice
    #[arg(long)]
    indicator_level: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    info!(run_control = %args.run_control.display(), format = ?args.format, "Starting extraction");

    let run_control = RunControl::from_file(&args.run_control)?;

    let mut extractor = ExtractorConfig::from_env();
    if let Some(radius) = args.earth_radius_km {
        extractor.earth_radius_km = radius;
    }
    if let Some(max) = args.max_alternatives {
        extractor.max_alternatives = max;
    }

    let mut source = NetCdfSourceConfig::default();
    if let Some(level) = args.indicator_level {
        source.indicator_level_index = level;
    }

    let options = RunOptions {
        output_dir: args.output_dir,
        extractor,
        source,
        ..RunOptions::new(args.format)
    };

    let output = execute(&run_control, &options)?;
    for diagnostic in &output.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if args.format == OutputFormat::Var {
        println!("{}", format_matrix(&output));
    } else {
        let (rows, cols) = output.shape();
        println!("data shape: ({}, {})", rows, cols);
    }

    Ok(())
}

/// Logs go to stderr so `var` output on stdout stays clean.
fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
