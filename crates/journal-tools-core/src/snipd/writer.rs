use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use journal_outline::is_property_line;
use regex::Regex;
use tracing::{info, warn};

use super::episode::{latest_date, sanitize_filename, Episode, ShowGroup};
use super::transform::transform_episode;
use crate::error::{ToolError, ToolResult};
use crate::fs::{read_text, write_atomic};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const EXPORT_MARKER: &str = "<!-- Episodes exported from Snipd -->";

static EXISTING_BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- ## \[\[(.+?)\]\]").expect("valid pattern"));
static EXISTING_PLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- ## ([^\[].+?)$").expect("valid pattern"));

#[derive(Debug)]
pub enum ShowOutcome {
    Created { episodes: usize },
    Updated { added: usize },
    /// Every episode was already present; the file was not touched.
    Unchanged,
    Failed(ToolError),
}

#[derive(Debug)]
pub struct ShowFileReport {
    pub show: String,
    pub path: PathBuf,
    pub outcome: ShowOutcome,
}

/// Writes one markdown page per show into an output directory.
#[derive(Debug, Clone)]
pub struct ShowWriter {
    output_dir: PathBuf,
    file_prefix: String,
}

impl ShowWriter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn file_path(&self, show: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.md", self.file_prefix, sanitize_filename(show)))
    }

    pub fn write(&self, group: &ShowGroup, now: NaiveDateTime) -> ShowFileReport {
        let path = self.file_path(&group.metadata.name);
        let outcome = if path.exists() {
            self.update(&path, group, now)
        } else {
            self.create(&path, group)
        };
        let outcome = outcome.unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "failed to write show file");
            ShowOutcome::Failed(err)
        });

        ShowFileReport {
            show: group.metadata.name.clone(),
            path,
            outcome,
        }
    }

    fn create(&self, path: &Path, group: &ShowGroup) -> ToolResult<ShowOutcome> {
        let mut content = group.metadata.to_properties();
        content.push('\n');
        content.push_str(EXPORT_MARKER);
        content.push_str("\n\n");
        content.push_str(&render_episodes(&group.episodes));

        write_atomic(path, &content, false)?;
        info!(path = %path.display(), episodes = group.episodes.len(), "created show file");
        Ok(ShowOutcome::Created {
            episodes: group.episodes.len(),
        })
    }

    fn update(&self, path: &Path, group: &ShowGroup, now: NaiveDateTime) -> ToolResult<ShowOutcome> {
        let existing = read_text(path)?;
        let known = existing_titles(&existing);
        let new_episodes: Vec<Episode> = group
            .episodes
            .iter()
            .filter(|episode| !known.contains(episode.title.trim()))
            .cloned()
            .collect();

        if new_episodes.is_empty() {
            info!(show = %group.metadata.name, "no new episodes");
            return Ok(ShowOutcome::Unchanged);
        }

        let marker = format!(
            "<!-- New episodes added on {} -->\n",
            now.format(TIMESTAMP_FORMAT)
        );
        let episodes = render_episodes(&new_episodes);
        let (properties, rest) = split_property_block(&existing);

        let content = if properties.is_empty() {
            let mut content = existing.clone();
            if !content.is_empty() && !content.ends_with('\n') {
                content.push('\n');
            }
            content.push('\n');
            content.push_str(&marker);
            content.push_str(&episodes);
            content
        } else {
            let properties = update_properties(
                properties,
                known.len() + new_episodes.len(),
                latest_date(&new_episodes).as_deref(),
            );
            format!("{properties}\n{marker}{episodes}{rest}")
        };

        write_atomic(path, &content, false)?;
        info!(path = %path.display(), added = new_episodes.len(), "updated show file");
        Ok(ShowOutcome::Updated {
            added: new_episodes.len(),
        })
    }
}

/// Titles already present in a show file, in either `- ## [[T]]` or
/// `- ## T` form.
pub fn existing_titles(content: &str) -> HashSet<String> {
    EXISTING_BRACKETED_RE
        .captures_iter(content)
        .chain(EXISTING_PLAIN_RE.captures_iter(content))
        .map(|captures| captures[1].trim().to_string())
        .collect()
}

/// Split off the leading run of `key:: value` lines. The first part keeps
/// its trailing newline.
pub fn split_property_block(content: &str) -> (&str, &str) {
    let mut end = 0;
    for line in content.split_inclusive('\n') {
        if !is_property_line(line.trim()) {
            break;
        }
        end += line.len();
    }
    content.split_at(end)
}

/// Rewrite `episode-count` and raise `last-episode-date` if `latest` is
/// newer. Either property is appended when missing.
pub fn update_properties(block: &str, episode_count: usize, latest: Option<&str>) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut saw_count = false;
    let mut saw_date = false;

    for line in block.lines() {
        if line.trim_start().starts_with("episode-count::") {
            saw_count = true;
            lines.push(format!("episode-count:: {episode_count}"));
        } else if let Some(current) = property_value(line, "last-episode-date::") {
            saw_date = true;
            let newest = match latest {
                Some(candidate) if candidate > current => candidate,
                _ => current,
            };
            lines.push(format!("last-episode-date:: {newest}"));
        } else {
            lines.push(line.to_string());
        }
    }

    if !saw_count {
        lines.push(format!("episode-count:: {episode_count}"));
    }
    if let (false, Some(latest)) = (saw_date, latest) {
        lines.push(format!("last-episode-date:: {latest}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn property_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(key).map(str::trim)
}

/// Transformed episodes, each ending in a newline.
pub fn render_episodes(episodes: &[Episode]) -> String {
    let mut out = String::new();
    for episode in episodes {
        let transformed = transform_episode(&episode.content);
        out.push_str(&transformed);
        if !transformed.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_both_title_forms() {
        let titles = existing_titles("- ## [[Episode 1]]\nSome content\n- ## Episode 2\nMore content");
        assert_eq!(titles.len(), 2);
        assert!(titles.contains("Episode 1"));
        assert!(titles.contains("Episode 2"));
    }

    #[test]
    fn splits_leading_properties() {
        let content = "type:: podcast\nshow:: X\n\nbody\nkey:: later\n";
        assert_eq!(
            split_property_block(content),
            ("type:: podcast\nshow:: X\n", "\nbody\nkey:: later\n")
        );
        assert_eq!(split_property_block("- ## T\n"), ("", "- ## T\n"));
    }

    #[test]
    fn updates_count_and_raises_date() {
        let block = "type:: podcast\nshow:: X\nepisode-count:: 2\nlast-episode-date:: 2025-01-05\n";

        assert_eq!(
            update_properties(block, 3, Some("2025-01-10")),
            "type:: podcast\nshow:: X\nepisode-count:: 3\nlast-episode-date:: 2025-01-10\n"
        );
        assert_eq!(
            update_properties(block, 3, Some("2024-12-31")),
            "type:: podcast\nshow:: X\nepisode-count:: 3\nlast-episode-date:: 2025-01-05\n"
        );
    }

    #[test]
    fn appends_missing_properties() {
        assert_eq!(
            update_properties("type:: podcast\n", 1, Some("2025-02-01")),
            "type:: podcast\nepisode-count:: 1\nlast-episode-date:: 2025-02-01\n"
        );
    }

    #[test]
    fn terminates_each_rendered_episode() {
        let episode = |content: &str| Episode {
            title: "T".to_string(),
            show: "S".to_string(),
            content: content.to_string(),
            episode_link: None,
            host: None,
            thumbnail_url: None,
            publish_date: None,
        };
        let rendered = render_episodes(&[episode("Content 1"), episode("Content 2\n")]);
        assert_eq!(rendered, "Content 1\nContent 2\n");
    }
}
