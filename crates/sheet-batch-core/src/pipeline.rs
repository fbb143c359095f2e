use std::path::Path;

use tracing::{info, instrument};

use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::executor::{BatchReport, JobExecutor, JobOutcome};
use crate::job::Job;
use crate::settings::Settings;
use crate::walker::TreeWalker;

#[instrument(skip_all)]
/// Walks `input_root` and returns every job, starting from empty settings.
///
/// Any config error aborts planning; no partial job list is returned.
pub fn plan_jobs(input_root: &Path, output_root: &Path, cfg: &BatchConfig) -> Result<Vec<Job>> {
    if !input_root.is_dir() {
        return Err(BatchError::io(
            input_root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "input root is not a directory"),
        ));
    }
    let walker = TreeWalker::new(
        output_root,
        cfg.config_file_name.clone(),
        cfg.scratch_data_path.clone(),
    );
    let jobs = walker.walk("", input_root, Settings::new())?;
    info!(count = jobs.len(), "planned packing jobs");
    Ok(jobs)
}

#[instrument(skip_all)]
/// Plans the batch, then runs every job. Planning errors are returned before
/// any process starts; job failures are reported in the `BatchReport`.
pub fn run_batch<F>(
    input_root: &Path,
    output_root: &Path,
    cfg: &BatchConfig,
    on_finish: F,
) -> Result<BatchReport>
where
    F: Fn(&JobOutcome) + Sync,
{
    let jobs = plan_jobs(input_root, output_root, cfg)?;
    Ok(executor_for(cfg).run(&jobs, on_finish))
}

/// Executor configured from `cfg`.
pub fn executor_for(cfg: &BatchConfig) -> JobExecutor {
    JobExecutor::new(cfg.program.clone()).with_max_concurrent(cfg.max_concurrent)
}
