use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{ToolError, ToolResult};
use crate::fs::{read_text, write_atomic};

/// Where a single-document tool reads its markdown from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `None` and `-` both mean stdin.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            None => Self::Stdin,
            Some(path) if path == Path::new("-") => Self::Stdin,
            Some(path) => Self::File(path.to_path_buf()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn read(&self) -> ToolResult<String> {
        match self {
            Self::File(path) => read_text(path),
            Self::Stdin => {
                let mut buffer = String::new();
                io::stdin().lock().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    InPlace(PathBuf),
}

impl OutputTarget {
    /// Resolve the `-o` / `-i` pair. Both together, or `-i` without an
    /// input file, is an argument error.
    pub fn resolve(
        input: &InputSource,
        output: Option<&Path>,
        in_place: bool,
    ) -> ToolResult<Self> {
        match (output, in_place) {
            (Some(_), true) => Err(ToolError::InvalidArguments(
                "--in-place cannot be combined with --output".to_string(),
            )),
            (None, true) => match input.path() {
                Some(path) => Ok(Self::InPlace(path.to_path_buf())),
                None => Err(ToolError::InvalidArguments(
                    "--in-place requires an input file".to_string(),
                )),
            },
            (Some(path), false) if path == Path::new("-") => Ok(Self::Stdout),
            (Some(path), false) => Ok(Self::File(path.to_path_buf())),
            (None, false) => Ok(Self::Stdout),
        }
    }

    pub fn write(&self, content: &str) -> ToolResult<()> {
        match self {
            Self::Stdout => write_stdout(content),
            Self::File(path) | Self::InPlace(path) => write_atomic(path, content, false),
        }
    }
}

/// Print to stdout, treating a closed pipe as success.
pub fn write_stdout(content: &str) -> ToolResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match handle.write_all(content.as_bytes()).and_then(|_| handle.flush()) {
        Ok(()) => Ok(()),
        Err(err) if should_ignore_pipe_error(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn should_ignore_pipe_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WouldBlock
    )
}
