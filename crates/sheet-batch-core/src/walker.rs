use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{BatchError, Result};
use crate::job::{Job, JobLocation, build_jobs};
use crate::settings::{LocalConfig, Settings};

/// Depth-first walk over an input tree, accumulating settings per directory
/// and building jobs wherever an output is declared.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    output_root: PathBuf,
    config_file_name: String,
    scratch_data: PathBuf,
}

impl TreeWalker {
    pub fn new(
        output_root: impl Into<PathBuf>,
        config_file_name: impl Into<String>,
        scratch_data: impl Into<PathBuf>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            config_file_name: config_file_name.into(),
            scratch_data: scratch_data.into(),
        }
    }

    /// Walks `current_dir`. `settings` is owned by this call: local overrides
    /// are applied to it, and every subdirectory receives its own clone, so
    /// siblings never see each other's overrides.
    ///
    /// Jobs of this directory come first, then each subdirectory's jobs in
    /// file-name order.
    pub fn walk(
        &self,
        relative_dir: &str,
        current_dir: &Path,
        mut settings: Settings,
    ) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        if let Some(local) = LocalConfig::load_in_dir(current_dir, &self.config_file_name)? {
            settings.merge_from(&local.overrides);
            if let Some(segments) = &local.output_path {
                let loc = JobLocation {
                    relative_dir,
                    current_dir,
                    output_root: &self.output_root,
                };
                let built = build_jobs(&loc, segments, &settings, &self.scratch_data)?;
                debug!(dir = %current_dir.display(), jobs = built.len(), "built jobs");
                jobs.extend(built);
            }
        }

        for child in subdirectories(current_dir)? {
            let name = child
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    BatchError::InvalidConfig(format!(
                        "directory name is not valid UTF-8: {}",
                        child.display()
                    ))
                })?;
            let child_relative = if relative_dir.is_empty() {
                name
            } else {
                format!("{relative_dir}/{name}")
            };
            jobs.extend(self.walk(&child_relative, &child, settings.clone())?);
        }

        Ok(jobs)
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BatchError::io(dir, e.into()))?;
        if entry.path().is_dir() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}
