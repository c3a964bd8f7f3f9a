//! Splits a Snipd markdown export into one Logseq page per podcast show.
//!
//! Re-running over a newer export only adds episodes whose titles are not
//! already present in the show's page.

mod episode;
mod transform;
mod writer;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

pub use episode::{
    extract_title, group_by_show, parse_episode, parse_episodes, sanitize_filename, Episode,
    ShowGroup, ShowMetadata,
};
pub use transform::{
    drop_collapsed_markers, reindent_transcript, remove_show_level_metadata, remove_show_notes,
    remove_title_brackets, tidy_spacing, transform_episode, unwrap_publish_date,
    TRANSCRIPT_MARKER,
};
pub use writer::{
    existing_titles, render_episodes, split_property_block, update_properties, ShowFileReport,
    ShowOutcome, ShowWriter, TIMESTAMP_FORMAT,
};

use crate::error::{ToolError, ToolResult};
use crate::fs::read_text;

#[derive(Debug)]
pub struct SplitReport {
    pub output_dir: PathBuf,
    pub episodes: usize,
    pub shows: Vec<ShowFileReport>,
}

impl SplitReport {
    pub fn has_failures(&self) -> bool {
        self.shows
            .iter()
            .any(|report| matches!(report.outcome, ShowOutcome::Failed(_)))
    }
}

/// Output directory for an export: an explicit one as given, otherwise
/// `configured` resolved against the export's directory.
pub fn resolve_output_dir(input: &Path, explicit: Option<&Path>, configured: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if configured.is_absolute() {
        return configured.to_path_buf();
    }
    match input.parent() {
        Some(parent) => parent.join(configured),
        None => configured.to_path_buf(),
    }
}

/// Parse `input`, group episodes by show and write each show's page into
/// `writer`'s output directory, creating it if needed.
pub fn split_export(input: &Path, writer: &ShowWriter, now: NaiveDateTime) -> ToolResult<SplitReport> {
    let export = read_text(input)?;
    let output_dir = writer.output_dir();
    fs::create_dir_all(output_dir).map_err(|err| ToolError::io(output_dir, err))?;

    let episodes = parse_episodes(&export);
    let episode_count = episodes.len();
    let groups = group_by_show(episodes);
    info!(episodes = episode_count, shows = groups.len(), "grouped export");

    let shows = groups.iter().map(|group| writer.write(group, now)).collect();

    Ok(SplitReport {
        output_dir: output_dir.to_path_buf(),
        episodes: episode_count,
        shows,
    })
}
