pub mod citations;
pub mod diff;
pub mod error;
pub mod fs;
pub mod journal;
pub mod logging;
pub mod snipd;
pub mod source;

pub use citations::{clean_citations, preview, ChangedLine, Preview};
pub use error::{ExitCode, ToolError, ToolResult};
pub use journal::{
    clean_files, parse_date, select_files, CleanOptions, CleanReport, FileOutcome, FileReport,
    InvalidDate, JournalLocator, Selection,
};
pub use journal_outline::{clean_journal_content, convert_to_outline, ConvertOptions, ParagraphMode};
pub use logging::init_tracing;
pub use source::{InputSource, OutputTarget};
