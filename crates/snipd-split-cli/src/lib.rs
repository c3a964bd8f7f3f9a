use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use journal_tools_config::{Config, LoadOptions};
use journal_tools_core::snipd::{resolve_output_dir, split_export, ShowOutcome, ShowWriter, SplitReport};
use journal_tools_core::source::write_stdout;
use journal_tools_core::{init_tracing, ExitCode, ToolError};

#[derive(Parser, Debug)]
#[command(
    name = "snipd-split",
    version,
    about = "Split a Snipd export into one Logseq page per show",
    long_about = None
)]
pub struct Cli {
    /// Snipd markdown export
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory for show pages (default: split_episodes next to INPUT)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Explicit config file instead of .journal-tools.toml discovery
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<ExitCode> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<ExitCode> {
    init_tracing(cli.verbose, false);

    if !cli.input.is_file() {
        return Err(ToolError::NotFound { path: cli.input }.into());
    }

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }
    let config = Config::load(load).context("failed to load configuration")?;

    let output_dir = resolve_output_dir(
        &cli.input,
        cli.output_dir.as_deref(),
        &config.snipd.output_dir,
    );
    let writer = ShowWriter::new(output_dir, config.snipd.file_prefix.clone());

    let report = split_export(&cli.input, &writer, Local::now().naive_local())?;
    write_stdout(&render_report(&cli, &report))?;

    Ok(if report.has_failures() {
        ExitCode::Failure
    } else {
        ExitCode::Success
    })
}

fn render_report(cli: &Cli, report: &SplitReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Input: {}", cli.input.display());
    let _ = writeln!(out, "Output directory: {}", report.output_dir.display());

    if report.episodes == 0 {
        out.push_str("No episodes found!\n");
        return out;
    }

    let _ = writeln!(
        out,
        "Parsed {} episodes across {} shows",
        report.episodes,
        report.shows.len()
    );
    for show in &report.shows {
        let name = show
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| show.show.clone());
        match &show.outcome {
            ShowOutcome::Created { episodes } => {
                let _ = writeln!(out, "  Created {name}: {episodes} episodes");
            }
            ShowOutcome::Updated { added } => {
                let _ = writeln!(out, "  Updated {name}: {added} new episodes");
            }
            ShowOutcome::Unchanged => {
                let _ = writeln!(out, "  {}: no new episodes to add", show.show);
            }
            ShowOutcome::Failed(err) => eprintln!("Failed to write {name}: {err}"),
        }
    }
    let _ = writeln!(
        out,
        "Done! Split into {} show files in {}",
        report.shows.len(),
        report.output_dir.display()
    );
    out
}
