//! Locating Logseq journal files by date and cleaning them in batches.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use journal_outline::clean_journal_content;
use thiserror::Error;
use tracing::{debug, warn};

use crate::diff::build_unified_diff;
use crate::error::ToolError;
use crate::fs::{read_text, write_atomic};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// File-name shapes probed for a date, in priority order.
const FILE_PATTERNS: [&str; 4] = [
    "{date}.md",
    "{date_underscored}.md",
    "journal_{date}.md",
    "{date}_journal.md",
];

#[derive(Debug, Clone)]
pub struct JournalLocator {
    directory: PathBuf,
}

impl JournalLocator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn candidates(&self, date: NaiveDate) -> Vec<PathBuf> {
        let dashed = date.format(DATE_FORMAT).to_string();
        let underscored = date.format("%Y_%m_%d").to_string();
        FILE_PATTERNS
            .iter()
            .map(|pattern| {
                let name = pattern
                    .replace("{date_underscored}", &underscored)
                    .replace("{date}", &dashed);
                self.directory.join(name)
            })
            .collect()
    }

    /// First existing regular file for `date`.
    pub fn find(&self, date: NaiveDate) -> Option<PathBuf> {
        let found = self
            .candidates(date)
            .into_iter()
            .find(|candidate| candidate.is_file());
        debug!(%date, found = ?found, "probed journal directory");
        found
    }

    pub fn find_range<I>(&self, dates: I) -> BTreeMap<NaiveDate, PathBuf>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .filter_map(|date| self.find(date).map(|path| (date, path)))
            .collect()
    }
}

/// A date argument that is not `YYYY-MM-DD`. Carries the day to fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{input}' (expected YYYY-MM-DD), using today ({fallback})")]
pub struct InvalidDate {
    pub input: String,
    pub fallback: NaiveDate,
}

/// Parse `YYYY-MM-DD`. Malformed text yields an [`InvalidDate`] holding
/// `today`, so callers can report the fallback before using it.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, InvalidDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|err| {
        debug!(input = text, error = %err, "date parse failed");
        InvalidDate {
            input: text.to_owned(),
            fallback: today,
        }
    })
}

/// Longest batch window searched; larger lookbacks are clamped to it.
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Date(NaiveDate),
    Recent {
        lookback_days: u32,
        include_today: bool,
    },
}

pub fn select_files(locator: &JournalLocator, selection: Selection, today: NaiveDate) -> Vec<PathBuf> {
    match selection {
        Selection::Date(date) => locator.find(date).into_iter().collect(),
        Selection::Recent {
            lookback_days,
            include_today,
        } => {
            let days = Days::new(u64::from(lookback_days.min(MAX_LOOKBACK_DAYS)));
            let start = today.checked_sub_days(days).unwrap_or(NaiveDate::MIN);
            let dates = start.iter_days().take_while(|date| *date <= today);
            locator
                .find_range(dates)
                .into_iter()
                .filter(|(date, _)| include_today || *date < today)
                .map(|(_, path)| path)
                .collect()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub dry_run: bool,
    pub backup: bool,
}

#[derive(Debug)]
pub enum FileOutcome {
    /// Content changed. In a dry run nothing was written and `diff` holds
    /// the pending change.
    Cleaned { diff: Option<String> },
    Unchanged,
    Failed(ToolError),
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Default)]
pub struct CleanReport {
    pub files: Vec<FileReport>,
}

impl CleanReport {
    pub fn cleaned_count(&self) -> usize {
        self.files
            .iter()
            .filter(|report| matches!(report.outcome, FileOutcome::Cleaned { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ToolError)> {
        self.files.iter().filter_map(|report| match &report.outcome {
            FileOutcome::Failed(err) => Some((report.path.as_path(), err)),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Clean each file in order. A failure is recorded and the loop moves on.
pub fn clean_files(files: &[PathBuf], options: CleanOptions) -> CleanReport {
    let files = files
        .iter()
        .map(|path| FileReport {
            path: path.clone(),
            outcome: clean_file(path, options),
        })
        .collect();
    CleanReport { files }
}

fn clean_file(path: &Path, options: CleanOptions) -> FileOutcome {
    let content = match read_text(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read journal");
            return FileOutcome::Failed(err);
        }
    };
    if content.is_empty() {
        return FileOutcome::Unchanged;
    }

    let cleaned = clean_journal_content(&content);
    if cleaned == content {
        return FileOutcome::Unchanged;
    }

    if options.dry_run {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return FileOutcome::Cleaned {
            diff: build_unified_diff(&content, &cleaned, &label),
        };
    }

    match write_atomic(path, &cleaned, options.backup) {
        Ok(()) => FileOutcome::Cleaned { diff: None },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to write journal");
            FileOutcome::Failed(err)
        }
    }
}
