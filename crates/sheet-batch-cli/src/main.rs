use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use sheet_batch_core::{BatchConfig, Job, executor_for, plan_jobs};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "sheet-batch",
    about = "Walk a folder tree of packer settings and run every packing job",
    version,
    author
)]
struct Cli {
    /// Input root directory
    #[arg(short, long, help_heading = "Input/Output")]
    input: PathBuf,
    /// Output root directory (declared output paths are joined onto it)
    #[arg(short, long, help_heading = "Input/Output")]
    output: PathBuf,
    /// Per-directory config file name (.json, or .yaml/.yml)
    #[arg(long, default_value = sheet_batch_core::DEFAULT_CONFIG_FILE_NAME, help_heading = "Input/Output")]
    config_name: String,
    /// Data output shared by per-image jobs (default: <temp>/.texture_packer_dummy_{v}.plist)
    #[arg(long, help_heading = "Input/Output")]
    scratch_data: Option<PathBuf>,

    // Execution
    /// Packer executable
    #[arg(long, default_value = sheet_batch_core::DEFAULT_PROGRAM, help_heading = "Execution")]
    packer: String,
    /// Maximum number of packer processes running at once (default: all at once)
    #[arg(long, help_heading = "Execution")]
    max_concurrent: Option<usize>,
    /// Print each packer command line but launch nothing
    #[arg(long, default_value_t = false, help_heading = "Execution")]
    dry_run: bool,
    /// Print the planned jobs and exit
    #[arg(long, default_value_t = false, help_heading = "Execution")]
    print_jobs: bool,
    /// Output format for --print-jobs: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Execution")]
    print_format: String,

    /// Show a progress bar while jobs run (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut builder = BatchConfig::builder()
        .config_file_name(cli.config_name.clone())
        .program(cli.packer.clone())
        .max_concurrent(cli.max_concurrent);
    if let Some(path) = &cli.scratch_data {
        builder = builder.scratch_data_path(path.clone());
    }
    let cfg = builder.build();

    let jobs = plan_jobs(&cli.input, &cli.output, &cfg)
        .with_context(|| format!("plan jobs under {}", cli.input.display()))?;

    if cli.print_jobs {
        match cli.print_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&jobs)?),
            _ => println!("{}", serde_json::to_string_pretty(&jobs)?),
        }
        return Ok(());
    }
    if cli.dry_run {
        for job in &jobs {
            println!("{}", job.command_line(&cfg.program));
        }
        return Ok(());
    }

    let bar = progress_bar(&jobs, cli.progress && !cli.quiet)?;
    let report = executor_for(&cfg).run(&jobs, |outcome| {
        if let Some(b) = &bar {
            b.set_message(outcome.sheet.display().to_string());
            b.inc(1);
        }
    });
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    info!(
        total = jobs.len(),
        succeeded = report.succeeded(),
        "packing finished"
    );
    if !report.is_success() {
        let failed: Vec<String> = report
            .failures()
            .map(|f| format!("{} ({})", f.sheet.display(), f.status))
            .collect();
        anyhow::bail!(
            "{} of {} packing jobs failed: {}",
            failed.len(),
            jobs.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

fn progress_bar(jobs: &[Job], enabled: bool) -> anyhow::Result<Option<ProgressBar>> {
    if !enabled || jobs.is_empty() {
        return Ok(None);
    }
    let b = ProgressBar::new(jobs.len() as u64);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} packing {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    Ok(Some(b))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
