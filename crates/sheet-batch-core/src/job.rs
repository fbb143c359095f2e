use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{BatchError, Result};
use crate::options::translate;
use crate::settings::{BatchOptions, Settings};

/// File name suffixes picked up as packer inputs (case-sensitive).
pub const IMAGE_SUFFIXES: &[&str] = &[".png", ".jpg"];

/// One resolved packer invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Tokens passed to the packer program, in order.
    pub args: Vec<String>,
    /// Input images, also present in `args`.
    pub inputs: Vec<PathBuf>,
    pub sheet: PathBuf,
    pub data: PathBuf,
    /// Directory (relative to the input root) that declared the output.
    pub source_dir: String,
}

impl Job {
    /// Full command line as a single display string (program first).
    pub fn command_line(&self, program: &str) -> String {
        let mut s = String::from(program);
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }
}

/// Where a job is being built: the declaring directory and the output root.
#[derive(Debug, Clone)]
pub struct JobLocation<'a> {
    /// Forward-slash path relative to the input root; empty at the root.
    pub relative_dir: &'a str,
    pub current_dir: &'a Path,
    pub output_root: &'a Path,
}

/// Builds the jobs for a directory that declares `output_segments`.
///
/// Combined mode yields one job; per-image mode yields one job per input
/// image, all of which write their data file to `scratch_data`. Those jobs run
/// concurrently and overwrite each other's data output; only the sheets matter
/// in that mode.
pub fn build_jobs(
    loc: &JobLocation<'_>,
    output_segments: &[String],
    settings: &Settings,
    scratch_data: &Path,
) -> Result<Vec<Job>> {
    if output_segments.is_empty() {
        return Err(BatchError::EmptyOutputPath {
            dir: loc.current_dir.to_path_buf(),
        });
    }
    let output_path = output_segments
        .iter()
        .fold(loc.output_root.to_path_buf(), |acc, seg| acc.join(seg));

    let opts = BatchOptions::from_settings(settings)?;
    let mut base = translate(settings);
    if !opts.flatten_path {
        base.push("--replace".into());
        base.push(replace_rule(loc.relative_dir));
    }

    let inputs = collect_inputs(loc.current_dir, &opts.input_directories)?;

    if opts.combine_images {
        let sheet = with_extension(&output_path, &opts.sheet_extension);
        let data = with_extension(&output_path, &opts.data_extension);
        let mut args = base;
        push_pair(&mut args, "--sheet", &sheet)?;
        push_pair(&mut args, "--data", &data)?;
        for input in &inputs {
            args.push(path_arg(input)?);
        }
        return Ok(vec![Job {
            args,
            inputs,
            sheet,
            data,
            source_dir: loc.relative_dir.to_string(),
        }]);
    }

    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = input.file_stem().unwrap_or_default();
        let sheet = with_extension(&output_path.join(stem), &opts.sheet_extension);
        let data = scratch_data.to_path_buf();
        let mut args = base.clone();
        args.push(path_arg(&input)?);
        push_pair(&mut args, "--sheet", &sheet)?;
        push_pair(&mut args, "--data", &data)?;
        jobs.push(Job {
            args,
            inputs: vec![input],
            sheet,
            data,
            source_dir: loc.relative_dir.to_string(),
        });
    }
    Ok(jobs)
}

/// Regex rewrite for the packer's `--replace`: prefixes sprite names with the
/// source sub-path.
///
/// At the input root the rule is `^=`, not `^=/`: plain `^=%s/` formatting of
/// an empty relative dir would prefix every sprite name with a stray `/`.
pub fn replace_rule(relative_dir: &str) -> String {
    if relative_dir.is_empty() {
        "^=".to_string()
    } else {
        format!("^={relative_dir}/")
    }
}

/// Lists images directly inside each input directory, directories in the
/// configured order, entries in file-name order.
pub fn collect_inputs(current_dir: &Path, input_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut list = Vec::new();
    for dir in input_dirs {
        let full = if dir == Path::new(".") {
            current_dir.to_path_buf()
        } else {
            current_dir.join(dir)
        };
        for entry in WalkDir::new(&full)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| BatchError::io(&full, e.into()))?;
            let p = entry.path();
            if p.is_file() && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

/// Suffix match on the raw file name, so names that are not valid UTF-8 are
/// still picked up.
fn is_image(p: &Path) -> bool {
    p.file_name().is_some_and(|n| {
        let bytes = n.as_encoded_bytes();
        IMAGE_SUFFIXES
            .iter()
            .any(|s| bytes.ends_with(s.as_bytes()))
    })
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut s = base.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Packer tokens are UTF-8; a path that is not is rejected instead of being
/// rewritten lossily.
fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        BatchError::InvalidConfig(format!(
            "path is not valid UTF-8 and cannot be passed to the packer: {}",
            path.display()
        ))
    })
}

fn push_pair(args: &mut Vec<String>, flag: &str, path: &Path) -> Result<()> {
    args.push(flag.to_string());
    args.push(path_arg(path)?);
    Ok(())
}
