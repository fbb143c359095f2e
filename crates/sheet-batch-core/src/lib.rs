//! Core library for batch-driving an external texture packer from a folder tree.
//!
//! - Settings: every directory may carry a config file (`texture_packer.json`) whose keys
//!   override what its ancestors set; `output_path` declares a sheet and is never inherited
//! - Translation: `--`-prefixed keys become packer tokens (flag, flag + value, or repeated)
//! - Jobs: one combined sheet per declaring directory, or one sheet per input image
//! - Execution: all jobs run as concurrent processes; the caller waits for every one
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use sheet_batch_core::{BatchConfig, run_batch};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = BatchConfig::builder().program("texturepacker").build();
//! let report = run_batch(Path::new("assets"), Path::new("build/sheets"), &cfg, |_| {})?;
//! println!("ok: {}", report.is_success());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod job;
pub mod options;
pub mod pipeline;
pub mod settings;
pub mod walker;

pub use config::*;
pub use error::*;
pub use executor::*;
pub use job::*;
pub use options::*;
pub use pipeline::*;
pub use settings::*;
pub use walker::*;

/// Convenience prelude for common types and functions.
/// Importing `sheet_batch_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{BatchConfig, BatchConfigBuilder};
    pub use crate::executor::{BatchReport, JobExecutor, JobOutcome, JobStatus};
    pub use crate::job::{Job, JobLocation, build_jobs};
    pub use crate::options::{OptionKind, translate};
    pub use crate::settings::{BatchOptions, LocalConfig, SettingValue, Settings};
    pub use crate::walker::TreeWalker;
    pub use crate::{plan_jobs, run_batch};
}
