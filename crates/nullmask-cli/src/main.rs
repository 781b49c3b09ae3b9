//! nullmask CLI
//!
//! Command-line tool that replaces values in a CSV or TSV dataset with nulls,
//! based on a probability and optionally a pattern and a column list.

use clap::error::ErrorKind as ClapErrorKind;
use clap::{CommandFactory, Parser};
use nullmask_core::{
    parse_column_list, run_batch, run_job, BatchFile, Error, InjectOptions, InjectionReport,
    MaskJob, DEFAULT_PROBABILITY,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nullmask")]
#[command(
    about = "Replaces values in a dataset with null values based on probability or pattern matching",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Path to the input CSV or TSV file
    #[arg(required_unless_present = "batch")]
    input_file: Option<PathBuf>,

    /// Path to the output file (written in the input's format)
    #[arg(required_unless_present = "batch")]
    output_file: Option<PathBuf>,

    /// Probability (0.0 to 1.0) of replacing a value with null
    #[arg(long, default_value_t = DEFAULT_PROBABILITY, allow_negative_numbers = true)]
    probability: f64,

    /// Regular expression matched at the start of string values; only
    /// matching values are replaced. All values are considered if omitted
    #[arg(long)]
    pattern: Option<String>,

    /// Comma-separated list of column names to apply the injection to.
    /// All columns are considered if omitted
    #[arg(long)]
    columns: Option<String>,

    /// Seed for the random generator, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON summary of the injection to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run every job in a JSON batch file instead of a single file
    #[arg(
        long,
        conflicts_with_all = ["input_file", "output_file", "probability", "pattern", "columns", "seed", "report"]
    )]
    batch: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.kind().label(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> nullmask_core::Result<ExitCode> {
    if let Some(batch) = &cli.batch {
        return cmd_batch(batch);
    }

    let (Some(input), Some(output)) = (cli.input_file, cli.output_file) else {
        Cli::command()
            .error(
                ClapErrorKind::MissingRequiredArgument,
                "input_file and output_file are required",
            )
            .exit()
    };

    let options = InjectOptions {
        probability: cli.probability,
        pattern: cli.pattern,
        columns: cli.columns.as_deref().map(parse_column_list),
    };

    let mut job = MaskJob::new(input, output).with_options(options);
    if let Some(seed) = cli.seed {
        job = job.with_seed(seed);
    }

    cmd_mask(&job, cli.report.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_mask(job: &MaskJob, report_path: Option<&Path>) -> nullmask_core::Result<()> {
    let report = run_job(job)?;
    log_report(&report);

    if let Some(path) = report_path {
        save_report(&report, path)?;
        info!("report saved to: {}", path.display());
    }

    Ok(())
}

fn cmd_batch(batch_path: &Path) -> nullmask_core::Result<ExitCode> {
    let batch = BatchFile::load(batch_path)?;
    info!(
        "running batch {} with {} jobs",
        batch_path.display(),
        batch.jobs.len()
    );

    let result = run_batch(&batch);

    let total_nullified: usize = result
        .completed
        .iter()
        .map(|(_, report)| report.total_nullified())
        .sum();
    info!(
        "batch complete: {} jobs succeeded, {} failed, {} cells nulled",
        result.completed.len(),
        result.failed.len(),
        total_nullified
    );

    if result.failed.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    for (input, err) in &result.failed {
        error!("{}: {}: {}", input.display(), err.kind().label(), err);
    }
    Ok(ExitCode::FAILURE)
}

fn log_report(report: &InjectionReport) {
    for column in &report.columns {
        info!(
            "column '{}': {} of {} eligible cells nulled",
            column.column, column.nullified, column.eligible
        );
    }
    if !report.skipped_columns.is_empty() {
        warn!(
            "skipped unknown columns: {}",
            report.skipped_columns.join(", ")
        );
    }
}

fn save_report(report: &InjectionReport, path: &Path) -> nullmask_core::Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    fs::write(path, content).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
