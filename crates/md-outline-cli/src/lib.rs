use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use journal_tools_config::{Config, LoadOptions};
use journal_tools_core::{
    convert_to_outline, init_tracing, ConvertOptions, ExitCode, InputSource, OutputTarget,
    ParagraphMode,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "md-to-outline",
    version,
    about = "Convert flat markdown into a Logseq bullet outline",
    long_about = None
)]
pub struct Cli {
    /// Markdown file to convert ('-' or omitted reads stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// How paragraph lines become bullets (default from config, else 'lines')
    #[arg(long, value_enum, value_name = "MODE")]
    pub paragraph_mode: Option<ParagraphModeArg>,

    /// Write the outline to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short = 'i', long, conflicts_with = "output")]
    pub in_place: bool,

    /// Explicit config file instead of .journal-tools.toml discovery
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ParagraphModeArg {
    /// One bullet per non-blank line
    Lines,
    /// One bullet per blank-line separated paragraph
    Blocks,
}

impl From<ParagraphModeArg> for ParagraphMode {
    fn from(value: ParagraphModeArg) -> Self {
        match value {
            ParagraphModeArg::Lines => ParagraphMode::Lines,
            ParagraphModeArg::Blocks => ParagraphMode::Blocks,
        }
    }
}

pub fn run() -> Result<ExitCode> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<ExitCode> {
    init_tracing(cli.verbose, false);

    let input = InputSource::from_arg(cli.input.as_deref());
    let target = OutputTarget::resolve(&input, cli.output.as_deref(), cli.in_place)?;

    let mut load = LoadOptions::default();
    if let Some(path) = &cli.config {
        load = load.with_override_path(path);
    }
    let config = Config::load(load).context("failed to load configuration")?;

    let options = ConvertOptions {
        paragraph_mode: cli
            .paragraph_mode
            .map(ParagraphMode::from)
            .unwrap_or(config.outline.paragraph_mode),
        indent_width: config.outline.indent_width,
    };

    let markdown = input.read()?;
    let outline = convert_to_outline(&markdown, &options);
    target.write(&outline)?;

    match &target {
        OutputTarget::Stdout => {}
        OutputTarget::File(path) | OutputTarget::InPlace(path) => {
            info!(path = %path.display(), mode = %options.paragraph_mode, "wrote outline");
            eprintln!("Outline written to {}", path.display());
        }
    }
    Ok(ExitCode::Success)
}
