use std::env;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use journal_tools_config::{Config, LoadOptions, JOURNAL_DIR_ENV};
use journal_tools_core::source::write_stdout;
use journal_tools_core::{
    clean_files, init_tracing, parse_date, select_files, CleanOptions, CleanReport, ExitCode,
    FileOutcome, JournalLocator, Selection, ToolError,
};

#[derive(Parser, Debug)]
#[command(
    name = "clean-journal",
    version,
    about = "Remove empty heading sections from Logseq journal pages",
    long_about = None
)]
pub struct Cli {
    /// Clean a single day (YYYY-MM-DD); malformed dates fall back to today
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Include today's journal (skipped by default)
    #[arg(long)]
    pub all: bool,

    /// Journal directory (overrides LOGSEQ_JOURNAL_DIR and config)
    #[arg(long, value_name = "DIR")]
    pub journal_dir: Option<PathBuf>,

    /// Explicit config file instead of .journal-tools.toml discovery
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a unified diff per file instead of writing
    #[arg(long)]
    pub dry_run: bool,

    /// Keep a .bak copy of every rewritten file
    #[arg(long)]
    pub backup: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<ExitCode> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<ExitCode> {
    init_tracing(cli.verbose, cli.quiet);

    let config = load_config(&cli)?;
    let directory = config
        .journal
        .require_directory()
        .map_err(|_| ToolError::JournalDirUnset)?;
    let locator = JournalLocator::new(directory);

    let today = Local::now().date_naive();
    let selection = match cli.date.as_deref() {
        Some(text) => Selection::Date(parse_date(text, today).unwrap_or_else(|err| {
            // Printed even with --quiet.
            eprintln!("Warning: {err}");
            err.fallback
        })),
        None => Selection::Recent {
            lookback_days: config.journal.lookback_days,
            include_today: cli.all,
        },
    };

    let files = select_files(&locator, selection, today);
    if files.is_empty() {
        if !cli.quiet {
            write_stdout("No journal files found to clean.\n")?;
        }
        return Ok(ExitCode::Success);
    }

    let options = CleanOptions {
        dry_run: cli.dry_run,
        backup: cli.backup || config.journal.backup,
    };

    let mut out = String::new();
    if !cli.quiet {
        let _ = writeln!(out, "Found {} journal files to clean:", files.len());
        for file in &files {
            let _ = writeln!(out, "  • {}", file_label(file));
        }
        out.push('\n');
    }

    let report = clean_files(&files, options);
    render_report(&report, &cli, &mut out);
    write_stdout(&out)?;

    Ok(if report.has_failures() {
        ExitCode::Failure
    } else {
        ExitCode::Success
    })
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut options = LoadOptions::default().with_env_journal_dir(env::var_os(JOURNAL_DIR_ENV));
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    if let Some(dir) = &cli.journal_dir {
        options = options.with_journal_dir(dir);
    }
    Config::load(options).context("failed to load configuration")
}

fn render_report(report: &CleanReport, cli: &Cli, out: &mut String) {
    for file in &report.files {
        match &file.outcome {
            FileOutcome::Cleaned { diff: Some(diff) } => out.push_str(diff),
            FileOutcome::Cleaned { diff: None } => {
                if !cli.quiet {
                    let _ = writeln!(out, "✓ Cleaned {}", file_label(&file.path));
                }
            }
            FileOutcome::Unchanged => {}
            FileOutcome::Failed(err) => eprintln!("✗ Error cleaning {}: {err}", file.path.display()),
        }
    }

    if cli.quiet {
        return;
    }

    let cleaned = report.cleaned_count();
    out.push('\n');
    match (cleaned, cli.dry_run) {
        (0, _) => out.push_str("No empty sections found to clean in any files.\n"),
        (n, true) => {
            let _ = writeln!(out, "Would clean {n} journal files.");
        }
        (n, false) => {
            let _ = writeln!(out, "Successfully cleaned {n} journal files.");
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
