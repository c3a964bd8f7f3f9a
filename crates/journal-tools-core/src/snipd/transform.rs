//! Rewrites a raw Snipd episode block into the shape stored in show files.

use std::sync::LazyLock;

use regex::Regex;

use super::episode::BRACKETED_TITLE_RE;

const SHOW_NOTES_START: &str = "- ### Show notes";
const SHOW_NOTES_END: &str = "#+END_QUOTE";
pub const TRANSCRIPT_MARKER: &str = "**📚 Transcript**";
const COLLAPSED_PROPERTY: &str = "collapsed:: true";

static TITLE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?m){}", BRACKETED_TITLE_RE.as_str())).expect("valid pattern")
});
static SHOW_LEVEL_METADATA_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?m)^[ \t]*show:: \[\[.+?\]\][ \t]*$",
        r"(?m)^[ \t]*host:: \[\[.+?\]\][ \t]*$",
        r"(?m)^[ \t]*!\[Image\]\(.+?\)\{.+?\}[ \t]*$",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid pattern"))
});
static PUBLISH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([ \t]*publish-date:: )\[\[(.+?)\]\]").expect("valid pattern")
});
static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid pattern"));
static GLUED_METADATA_RES: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (r"(- ## [^\n]+)\s+(episode-link::)", "$1\n  $2"),
        (r"(episode-link:: [^\n]+)\s+(publish-date::)", "$1\n  $2"),
        (r"(publish-date:: [^\n]+)\s+(- ###)", "$1\n$2"),
    ]
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid pattern"), replacement))
});

/// Run the whole pipeline over one episode's raw text.
pub fn transform_episode(content: &str) -> String {
    let content = remove_title_brackets(content);
    let content = remove_show_level_metadata(&content);
    let content = unwrap_publish_date(&content);
    let content = tidy_spacing(&content);
    let content = remove_show_notes(&content);
    let content = drop_collapsed_markers(&content);
    reindent_transcript(&content)
}

pub fn remove_title_brackets(content: &str) -> String {
    TITLE_LINE_RE.replace_all(content, "- ## $1").into_owned()
}

/// Blank out `show::`, `host::` and sized image lines; the show file's page
/// properties carry them instead.
pub fn remove_show_level_metadata(content: &str) -> String {
    SHOW_LEVEL_METADATA_RES
        .iter()
        .fold(content.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, "").into_owned()
        })
}

pub fn unwrap_publish_date(content: &str) -> String {
    PUBLISH_DATE_RE.replace_all(content, "$1$2").into_owned()
}

/// Collapse blank-line runs and put metadata that ended up on one line
/// back onto separate lines.
pub fn tidy_spacing(content: &str) -> String {
    let collapsed = BLANK_RUN_RE.replace_all(content, "\n\n").into_owned();
    GLUED_METADATA_RES
        .iter()
        .fold(collapsed, |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Cut every span from `- ### Show notes` through the closing
/// `#+END_QUOTE` line and the whitespace after it. An unterminated span is
/// left alone.
pub fn remove_show_notes(content: &str) -> String {
    let mut content = content.to_string();
    while let Some(start) = content.find(SHOW_NOTES_START) {
        let Some(marker) = content[start..].find(SHOW_NOTES_END) else {
            break;
        };
        let after_marker = start + marker + SHOW_NOTES_END.len();
        let end = match content[after_marker..].find('\n') {
            Some(newline) => {
                let from = after_marker + newline;
                let skipped = content[from..]
                    .find(|ch: char| !matches!(ch, '\n' | '\t' | ' '))
                    .unwrap_or(content.len() - from);
                from + skipped
            }
            None => content.len(),
        };
        content.replace_range(start..end, "");
    }
    content
}

/// Drop `collapsed:: true` lines, except the one directly under the
/// transcript heading.
pub fn drop_collapsed_markers(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut previous_content: Option<&str> = None;

    for line in content.split('\n') {
        let trimmed = line.trim();
        if trimmed == COLLAPSED_PROPERTY {
            let under_transcript =
                previous_content.is_some_and(|prev| prev.ends_with(TRANSCRIPT_MARKER));
            if under_transcript {
                kept.push(line);
                previous_content = Some(trimmed);
            }
            continue;
        }
        if !trimmed.is_empty() {
            previous_content = Some(trimmed);
        }
        kept.push(line);
    }
    kept.join("\n")
}

/// Indent transcript lines under the transcript heading. Quote delimiters
/// become bullets two columns in; everything else sits four columns in. The
/// transcript ends at a heading no deeper than the transcript heading.
pub fn reindent_transcript(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut base: Option<usize> = None;

    for line in content.split('\n') {
        if line.contains(TRANSCRIPT_MARKER) {
            base = Some(leading_width(line));
            out.push(line.to_string());
            continue;
        }

        let trimmed = line.trim();
        match base {
            Some(indent) if !trimmed.is_empty() => {
                if leading_width(line) <= indent && line.contains("##") {
                    base = None;
                    out.push(line.to_string());
                } else {
                    out.push(reindent_transcript_line(trimmed, indent));
                }
            }
            _ => out.push(line.to_string()),
        }
    }
    out.join("\n")
}

fn reindent_transcript_line(trimmed: &str, base: usize) -> String {
    let bullet_indent = base + 2;
    if trimmed.starts_with("#+BEGIN_QUOTE") || trimmed.starts_with("#+END_QUOTE") {
        format!("{}- {trimmed}", " ".repeat(bullet_indent))
    } else {
        format!("{}{trimmed}", " ".repeat(bullet_indent + 2))
    }
}

fn leading_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_title_brackets() {
        let result = remove_title_brackets("- ## [[Episode Title]]\n  Some content");
        assert_eq!(result, "- ## Episode Title\n  Some content");
    }

    #[test]
    fn removes_show_level_metadata_only() {
        let content = "- ## Episode Title
  show:: [[Test Show]]
  host:: [[Test Host]]
  ![Image](https://example.com/thumb.jpg){height 300, width 400}
  episode-link:: [Link](https://example.com)";

        let result = remove_show_level_metadata(content);

        assert_eq!(
            result,
            "- ## Episode Title\n\n\n\n  episode-link:: [Link](https://example.com)"
        );
    }

    #[test]
    fn unwraps_publish_date_link() {
        assert_eq!(
            unwrap_publish_date("  publish-date:: [[2025-01-01]]"),
            "  publish-date:: 2025-01-01"
        );
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(tidy_spacing("Line 1\n\n\n\nLine 2"), "Line 1\n\nLine 2");
    }

    #[test]
    fn splits_glued_metadata() {
        let glued = "- ## Title episode-link:: [Open in Snipd](u) publish-date:: 2025-01-01 - ### Summary";
        assert_eq!(
            tidy_spacing(glued),
            "- ## Title\n  episode-link:: [Open in Snipd](u)\n  publish-date:: 2025-01-01\n- ### Summary"
        );
    }

    #[test]
    fn removes_show_notes_blocks() {
        let content = "- ### Summary
Content here

- ### Show notes
#+BEGIN_QUOTE
These should be removed
#+END_QUOTE

- ### More content";

        assert_eq!(
            remove_show_notes(content),
            "- ### Summary\nContent here\n\n- ### More content"
        );
    }

    #[test]
    fn keeps_unterminated_show_notes() {
        let content = "- ### Show notes\n  no end marker";
        assert_eq!(remove_show_notes(content), content);
    }

    #[test]
    fn keeps_only_transcript_collapsed_marker() {
        let content = "collapsed:: true
- #### **📚 Transcript**
  collapsed:: true
  Some transcript content
collapsed:: true";

        assert_eq!(
            drop_collapsed_markers(content),
            "- #### **📚 Transcript**\n  collapsed:: true\n  Some transcript content"
        );
    }

    #[test]
    fn indents_transcript_body() {
        let content = "- #### **📚 Transcript**
  #+BEGIN_QUOTE
  **Speaker 1**
  Regular content

  #+END_QUOTE
- ## Next episode
  untouched";

        assert_eq!(
            reindent_transcript(content),
            "- #### **📚 Transcript**
  - #+BEGIN_QUOTE
    **Speaker 1**
    Regular content

  - #+END_QUOTE
- ## Next episode
  untouched"
        );
    }

    #[test]
    fn full_pipeline_produces_clean_episode() {
        let raw = "- ## [[Test Episode Title]]
  episode-link:: [Open in Snipd](https://example.com/episode)
  publish-date:: [[2025-01-01]]
  show:: [[Test Show]]
  host:: [[Test Host]]
  ![Image](https://example.com/thumb.jpg){height 300}

- ### Summary
  This is a test episode summary.

- ### Show notes
  #+BEGIN_QUOTE
  These are show notes that should be removed.
  #+END_QUOTE

- #### **📚 Transcript**
  collapsed:: true
  - #+BEGIN_QUOTE
    **Speaker 1**
    This is transcript content.
  - #+END_QUOTE
";

        let result = transform_episode(raw);

        assert_eq!(
            result,
            "- ## Test Episode Title
  episode-link:: [Open in Snipd](https://example.com/episode)
  publish-date:: 2025-01-01
- ### Summary
  This is a test episode summary.

- #### **📚 Transcript**
    collapsed:: true
    - #+BEGIN_QUOTE
    **Speaker 1**
    This is transcript content.
    - #+END_QUOTE
"
        );
    }
}
