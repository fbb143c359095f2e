use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::executor::DEFAULT_PROGRAM;
use crate::settings::DEFAULT_CONFIG_FILE_NAME;

/// File name of the shared data output used by per-image jobs. `{v}` is the
/// packer's variant placeholder.
pub const SCRATCH_DATA_FILE_NAME: &str = ".texture_packer_dummy_{v}.plist";

/// Run-level configuration for planning and executing a batch.
/// Key notes:
///   - `config_file_name` is looked up in every directory of the input tree
///   - `scratch_data_path` receives the (discarded) data output of per-image jobs
///   - `max_concurrent` of `None` launches every job at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Per-directory config file name; `.yaml`/`.yml` names are read as YAML.
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,
    #[serde(default = "default_scratch_data_path")]
    pub scratch_data_path: PathBuf,
    /// Packer executable, resolved through `PATH`.
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            config_file_name: default_config_file_name(),
            scratch_data_path: default_scratch_data_path(),
            program: default_program(),
            max_concurrent: None,
        }
    }
}

impl BatchConfig {
    /// Create a fluent builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::new()
    }
}

fn default_config_file_name() -> String {
    DEFAULT_CONFIG_FILE_NAME.to_string()
}
fn default_scratch_data_path() -> PathBuf {
    std::env::temp_dir().join(SCRATCH_DATA_FILE_NAME)
}
fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

/// Builder for `BatchConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct BatchConfigBuilder {
    cfg: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: BatchConfig::default(),
        }
    }
    pub fn config_file_name(mut self, v: impl Into<String>) -> Self {
        self.cfg.config_file_name = v.into();
        self
    }
    pub fn scratch_data_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.scratch_data_path = v.into();
        self
    }
    pub fn program(mut self, v: impl Into<String>) -> Self {
        self.cfg.program = v.into();
        self
    }
    pub fn max_concurrent(mut self, v: Option<usize>) -> Self {
        self.cfg.max_concurrent = v;
        self
    }
    pub fn build(self) -> BatchConfig {
        self.cfg
    }
}
