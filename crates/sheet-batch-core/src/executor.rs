use std::fmt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::job::Job;

/// Default packer program.
pub const DEFAULT_PROGRAM: &str = "texturepacker";

/// How a single job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    /// Nonzero exit. `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    /// The program could not be started or waited on.
    SpawnFailed { message: String },
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    fn from_exit(status: ExitStatus) -> Self {
        if status.success() {
            Self::Succeeded
        } else {
            Self::Failed {
                code: status.code(),
            }
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("ok"),
            Self::Failed { code: Some(c) } => write!(f, "exited with status {c}"),
            Self::Failed { code: None } => f.write_str("terminated by signal"),
            Self::SpawnFailed { message } => write!(f, "failed to start: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Position of the job in the list handed to the executor.
    pub index: usize,
    pub sheet: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
}

/// Per-job outcomes, in job order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    /// True when every job succeeded (vacuously true for zero jobs).
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }
}

/// Runs jobs as concurrent external processes and waits for all of them.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    program: String,
    max_concurrent: Option<usize>,
}

impl Default for JobExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl JobExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            max_concurrent: None,
        }
    }

    /// Caps simultaneously running processes. `None` (default) launches every
    /// job at once.
    pub fn with_max_concurrent(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent = limit.filter(|n| *n > 0);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Launches `jobs` and blocks until each one has finished. A failing job
    /// never cancels the others. `on_finish` is called once per job as it
    /// completes.
    pub fn run<F>(&self, jobs: &[Job], on_finish: F) -> BatchReport
    where
        F: Fn(&JobOutcome) + Sync,
    {
        info!(count = jobs.len(), program = %self.program, "launching packing jobs");
        let mut outcomes = match self.max_concurrent {
            Some(limit) if limit < jobs.len() => self.run_bounded(jobs, limit, &on_finish),
            _ => self.run_all(jobs, &on_finish),
        };
        outcomes.sort_by_key(|o| o.index);
        for o in outcomes.iter().filter(|o| !o.status.is_success()) {
            warn!(index = o.index, sheet = %o.sheet.display(), status = %o.status, "packing job failed");
        }
        BatchReport { outcomes }
    }

    /// Every process is started before any is waited on. Each child then gets
    /// its own waiter thread so `on_finish` fires in completion order.
    fn run_all<F>(&self, jobs: &[Job], on_finish: &F) -> Vec<JobOutcome>
    where
        F: Fn(&JobOutcome) + Sync,
    {
        let children: Vec<std::io::Result<Child>> = jobs.iter().map(|j| self.spawn(j)).collect();
        let outcomes = Mutex::new(Vec::with_capacity(jobs.len()));
        thread::scope(|s| {
            for (index, (child, job)) in children.into_iter().zip(jobs).enumerate() {
                let outcomes = &outcomes;
                s.spawn(move || {
                    let status = match child {
                        Ok(mut c) => wait(&mut c),
                        Err(e) => JobStatus::SpawnFailed {
                            message: e.to_string(),
                        },
                    };
                    let outcome = finish(index, job, status, on_finish);
                    outcomes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(outcome);
                });
            }
        });
        outcomes.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_bounded<F>(&self, jobs: &[Job], limit: usize, on_finish: &F) -> Vec<JobOutcome>
    where
        F: Fn(&JobOutcome) + Sync,
    {
        let next = AtomicUsize::new(0);
        let outcomes = Mutex::new(Vec::with_capacity(jobs.len()));
        thread::scope(|s| {
            for _ in 0..limit {
                s.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(job) = jobs.get(index) else {
                            break;
                        };
                        let status = match self.spawn(job) {
                            Ok(mut c) => wait(&mut c),
                            Err(e) => JobStatus::SpawnFailed {
                                message: e.to_string(),
                            },
                        };
                        let outcome = finish(index, job, status, on_finish);
                        outcomes
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .push(outcome);
                    }
                });
            }
        });
        outcomes.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn(&self, job: &Job) -> std::io::Result<Child> {
        debug!(command = %job.command_line(&self.program), "spawn");
        Command::new(&self.program).args(&job.args).spawn()
    }
}

fn wait(child: &mut Child) -> JobStatus {
    match child.wait() {
        Ok(status) => JobStatus::from_exit(status),
        Err(e) => JobStatus::SpawnFailed {
            message: e.to_string(),
        },
    }
}

fn finish<F>(index: usize, job: &Job, status: JobStatus, on_finish: &F) -> JobOutcome
where
    F: Fn(&JobOutcome) + Sync,
{
    let outcome = JobOutcome {
        index,
        sheet: job.sheet.clone(),
        status,
    };
    if outcome.status.is_success() {
        info!(index, sheet = %job.sheet.display(), "packed");
    }
    on_finish(&outcome);
    outcome
}
