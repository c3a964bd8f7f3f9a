use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use journal_tools_core::{
    clean_citations, init_tracing, preview, ExitCode, InputSource, OutputTarget, Preview,
};

const RULE: &str = "==================================================";

#[derive(Parser, Debug)]
#[command(
    name = "clean-citations",
    version,
    about = "Strip Perplexity source citations from markdown",
    long_about = None,
    after_help = "Examples:\n  clean-citations input.md               print cleaned text\n  \
                  clean-citations input.md -o out.md     write to out.md\n  \
                  clean-citations input.md -i            rewrite input.md\n  \
                  cat input.md | clean-citations         stdin to stdout"
)]
pub struct Cli {
    /// Input file ('-' or omitted reads stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Write cleaned text to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(short = 'i', long, conflicts_with = "output")]
    pub in_place: bool,

    /// Show changed lines on stderr and write nothing
    #[arg(long)]
    pub preview: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<ExitCode> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<ExitCode> {
    init_tracing(cli.verbose, false);

    let input = InputSource::from_arg(cli.input.as_deref());
    let target = OutputTarget::resolve(&input, cli.output.as_deref(), cli.in_place)?;

    let original = input.read()?;
    let cleaned = clean_citations(&original);

    if cli.preview {
        eprint!("{}", render_preview(preview(&original, &cleaned).as_ref()));
        return Ok(ExitCode::Success);
    }

    target.write(&cleaned)?;
    match &target {
        OutputTarget::Stdout => {}
        OutputTarget::InPlace(path) => eprintln!("Cleaned sources in {}", path.display()),
        OutputTarget::File(path) => eprintln!("Cleaned content written to {}", path.display()),
    }
    Ok(ExitCode::Success)
}

pub fn render_preview(preview: Option<&Preview>) -> String {
    let Some(preview) = preview else {
        return "No source links found to clean\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Changes preview:");
    let _ = writeln!(out, "{RULE}");
    for change in &preview.changes {
        let _ = writeln!(out, "Line {}:", change.number);
        let _ = writeln!(out, "  - {}", change.before);
        let _ = writeln!(out, "  + {}", change.after);
        out.push('\n');
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Would remove source links from {} lines",
        preview.original_line_count
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_tools_core::ChangedLine;

    #[test]
    fn renders_changed_lines() {
        let preview = Preview {
            changes: vec![ChangedLine {
                number: 2,
                before: "a [x](u)".to_string(),
                after: "a".to_string(),
            }],
            original_line_count: 3,
        };

        let rendered = render_preview(Some(&preview));

        assert!(rendered.contains("Line 2:\n  - a [x](u)\n  + a\n"));
        assert!(rendered.ends_with("Would remove source links from 3 lines\n"));
    }

    #[test]
    fn reports_nothing_to_clean() {
        assert_eq!(render_preview(None), "No source links found to clean\n");
    }
}
