use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

static EPISODE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- ## \[\[").expect("valid pattern"));
pub(crate) static BRACKETED_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- ## \[\[(.+?)\]\]").expect("valid pattern"));
static SHOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*show:: \[\[(.+?)\]\]").expect("valid pattern"));
static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*host:: \[\[(.+?)\]\]").expect("valid pattern"));
static PUBLISH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*publish-date:: \[\[(.+?)\]\]").expect("valid pattern"));
static EPISODE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*episode-link:: \[Open in Snipd\]\((.+?)\)").expect("valid pattern")
});
static THUMBNAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*!\[Image\]\((.+?)\)").expect("valid pattern"));

/// Lines after the title that are searched for metadata.
const METADATA_WINDOW: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub title: String,
    pub show: String,
    /// Raw export text, starting at the `- ## [[title]]` line.
    pub content: String,
    pub episode_link: Option<String>,
    pub host: Option<String>,
    pub thumbnail_url: Option<String>,
    pub publish_date: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct EpisodeMetadata {
    show: Option<String>,
    host: Option<String>,
    publish_date: Option<String>,
    episode_link: Option<String>,
    thumbnail_url: Option<String>,
}

impl EpisodeMetadata {
    fn scan<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut metadata = Self::default();
        for line in lines {
            capture_first(&mut metadata.show, &SHOW_RE, line);
            capture_first(&mut metadata.host, &HOST_RE, line);
            capture_first(&mut metadata.publish_date, &PUBLISH_DATE_RE, line);
            capture_first(&mut metadata.episode_link, &EPISODE_LINK_RE, line);
            capture_first(&mut metadata.thumbnail_url, &THUMBNAIL_RE, line);
        }
        metadata
    }
}

fn capture_first(slot: &mut Option<String>, pattern: &Regex, line: &str) {
    if slot.is_some() {
        return;
    }
    if let Some(captures) = pattern.captures(line) {
        *slot = Some(captures[1].to_string());
    }
}

pub fn extract_title(first_line: &str) -> Option<String> {
    BRACKETED_TITLE_RE
        .captures(first_line)
        .map(|captures| captures[1].to_string())
}

/// Parse one episode block. Blocks without a bracketed title or a `show::`
/// property are rejected.
pub fn parse_episode(text: &str) -> Option<Episode> {
    let mut lines = text.split('\n');
    let title = extract_title(lines.next()?)?;
    let metadata = EpisodeMetadata::scan(lines.take(METADATA_WINDOW));

    let Some(show) = metadata.show else {
        warn!(title = %truncate(&title, 50), "episode has no show, skipping");
        return None;
    };

    Some(Episode {
        title,
        show,
        content: text.to_string(),
        episode_link: metadata.episode_link,
        host: metadata.host,
        thumbnail_url: metadata.thumbnail_url,
        publish_date: metadata.publish_date,
    })
}

/// Split a whole export at each `- ## [[` line. Text before the first
/// episode is ignored.
pub fn parse_episodes(export: &str) -> Vec<Episode> {
    let starts: Vec<usize> = EPISODE_START_RE
        .find_iter(export)
        .map(|found| found.start())
        .collect();

    let episodes: Vec<Episode> = starts
        .iter()
        .enumerate()
        .filter_map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(export.len());
            parse_episode(&export[start..end])
        })
        .collect();

    debug!(blocks = starts.len(), parsed = episodes.len(), "parsed export");
    episodes
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowMetadata {
    pub name: String,
    pub host: Option<String>,
    pub thumbnail_url: Option<String>,
    pub episode_count: usize,
    pub last_episode_date: Option<String>,
}

impl ShowMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
            thumbnail_url: None,
            episode_count: 0,
            last_episode_date: None,
        }
    }

    /// Logseq page properties, one per line, newline-terminated.
    pub fn to_properties(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "type:: podcast");
        let _ = writeln!(out, "show:: {}", self.name);
        if let Some(host) = &self.host {
            let _ = writeln!(out, "host:: {host}");
        }
        if let Some(thumbnail) = &self.thumbnail_url {
            let _ = writeln!(out, "thumbnail:: {thumbnail}");
        }
        let _ = writeln!(out, "episode-count:: {}", self.episode_count);
        if let Some(date) = &self.last_episode_date {
            let _ = writeln!(out, "last-episode-date:: {date}");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowGroup {
    pub metadata: ShowMetadata,
    pub episodes: Vec<Episode>,
}

/// Group episodes by show in first-seen order. Host and thumbnail come from
/// each show's first episode; the last episode date is the greatest publish
/// date, compared as text.
pub fn group_by_show(episodes: Vec<Episode>) -> Vec<ShowGroup> {
    let mut groups: Vec<ShowGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for episode in episodes {
        let slot = *index.entry(episode.show.clone()).or_insert_with(|| {
            let mut metadata = ShowMetadata::new(&episode.show);
            metadata.host = episode.host.clone();
            metadata.thumbnail_url = episode.thumbnail_url.clone();
            groups.push(ShowGroup {
                metadata,
                episodes: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].episodes.push(episode);
    }

    for group in &mut groups {
        group.metadata.episode_count = group.episodes.len();
        group.metadata.last_episode_date = latest_date(&group.episodes);
    }
    groups
}

pub(crate) fn latest_date(episodes: &[Episode]) -> Option<String> {
    episodes
        .iter()
        .filter_map(|episode| episode.publish_date.clone())
        .max()
}

const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a show name safe to use as a file name.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|ch| !matches!(ch, '(' | ')'))
        .map(|ch| {
            if INVALID_FILENAME_CHARS.contains(&ch) {
                '-'
            } else {
                ch
            }
        })
        .collect();
    replaced
        .trim_matches(|ch| matches!(ch, '-' | ' ' | '.'))
        .to_string()
}
