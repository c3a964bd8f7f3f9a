use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    InvalidArguments = 2,
    Interrupted = 130,
}

impl ExitCode {
    /// Exit code for an error chain, taken from the first [`ToolError`] in it.
    pub fn for_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut current = Some(err);
        while let Some(error) = current {
            if let Some(tool_error) = error.downcast_ref::<ToolError>() {
                return tool_error.exit_code();
            }
            current = error.source();
        }
        Self::Failure
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("journal directory is not configured; pass --journal-dir, set LOGSEQ_JOURNAL_DIR, or add [journal] directory to .journal-tools.toml")]
    JournalDirUnset,

    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("i/o error: {0}")]
    Stream(#[source] io::Error),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("interrupted by user")]
    Interrupted,
}

impl ToolError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::Interrupted => Self::Interrupted,
            _ => Self::Io { path, source },
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::JournalDirUnset | Self::NotFound { .. } | Self::Io { .. } | Self::Stream(_) => {
                ExitCode::Failure
            }
            Self::InvalidArguments(_) => ExitCode::InvalidArguments,
            Self::Interrupted => ExitCode::Interrupted,
        }
    }
}

impl From<io::Error> for ToolError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::Stream(err)
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
