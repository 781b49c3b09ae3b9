//! Masking jobs: read a file, inject nulls, write the result
//!
//! A [`MaskJob`] describes a single input/output pair. A [`BatchFile`]
//! stores several jobs as JSON so they can be run together.

use crate::error::{Error, Result};
use crate::injector::{inject_nulls, InjectOptions, InjectionReport};
use crate::parser::{read_table, TableFormat};
use crate::writer::write_table;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One input file masked into one output file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskJob {
    /// Delimited file to read
    pub input: PathBuf,
    /// Where the masked table is written
    pub output: PathBuf,
    #[serde(flatten)]
    pub options: InjectOptions,
    /// Seed for the random source; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl MaskJob {
    /// Create a job with default options
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options: InjectOptions::default(),
            seed: None,
        }
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the injection options
    pub fn with_options(mut self, options: InjectOptions) -> Self {
        self.options = options;
        self
    }
}

/// Run a single job and return what the injector did.
///
/// The output is written in the same format as the input.
pub fn run_job(job: &MaskJob) -> Result<InjectionReport> {
    job.options.validate()?;

    if !job.input.exists() {
        return Err(Error::InputNotFound(job.input.clone()));
    }
    let format = TableFormat::from_path(&job.input)
        .ok_or_else(|| Error::UnsupportedFormat(job.input.clone()))?;

    let table = read_table(&job.input).map_err(|e| {
        error!("failed to read {}: {}", job.input.display(), e);
        e
    })?;

    let mut rng = match job.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let injection = inject_nulls(table, &job.options, &mut rng)?;

    write_table(&injection.table, &job.output, format).map_err(|e| {
        error!("failed to write {}: {}", job.output.display(), e);
        e
    })?;

    info!(
        "masked data saved to: {} ({} of {} eligible cells nulled)",
        job.output.display(),
        injection.report.total_nullified(),
        injection.report.total_eligible()
    );

    Ok(injection.report)
}

/// A batch file containing multiple masking jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchFile {
    /// Jobs, run in order
    pub jobs: Vec<MaskJob>,
}

impl BatchFile {
    /// Load a batch file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the batch file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Result of running a batch
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Reports of the jobs that succeeded (output path, report)
    pub completed: Vec<(PathBuf, InjectionReport)>,
    /// Jobs that failed (input path, error)
    pub failed: Vec<(PathBuf, Error)>,
}

/// Run every job in the batch, continuing past failures
pub fn run_batch(batch: &BatchFile) -> BatchResult {
    let mut result = BatchResult::default();

    for job in &batch.jobs {
        match run_job(job) {
            Ok(report) => result.completed.push((job.output.clone(), report)),
            Err(e) => {
                error!("job for {} failed: {}", job.input.display(), e);
                result.failed.push((job.input.clone(), e));
            }
        }
    }

    result
}
