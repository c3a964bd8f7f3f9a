#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMark {
    pub level: usize,
    pub bullet_prefixed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Atx,
    Setext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownHeading {
    pub level: usize,
    pub text: String,
    pub kind: HeadingKind,
}

const MAX_LEVEL: usize = 6;

/// Journal headings: `##`, `- ##`, `### Title`. No space is required after the hashes.
pub fn detect_journal_heading(line: &str) -> Option<HeadingMark> {
    let trimmed = line.trim();
    let (candidate, bullet_prefixed) = match trimmed.strip_prefix("- ") {
        Some(rest) if rest.starts_with("##") => (rest, true),
        _ => (trimmed, false),
    };

    let level = count_hashes(candidate);
    if level == 0 || level > MAX_LEVEL {
        return None;
    }

    Some(HeadingMark {
        level,
        bullet_prefixed,
    })
}

pub fn detect_atx_heading(line: &str) -> Option<MarkdownHeading> {
    let level = count_hashes(line);
    if level == 0 || level > MAX_LEVEL {
        return None;
    }

    let after_hashes = &line[level..];
    if !after_hashes.starts_with(char::is_whitespace) {
        return None;
    }

    let mut content = after_hashes.trim();
    let stripped_hashes = content.trim_end_matches('#');
    if stripped_hashes.len() < content.len()
        && (stripped_hashes.is_empty() || stripped_hashes.ends_with(char::is_whitespace))
    {
        content = stripped_hashes.trim_end();
    }

    Some(MarkdownHeading {
        level,
        text: content.to_string(),
        kind: HeadingKind::Atx,
    })
}

/// `text` followed by an `=`/`-` underline. Returns the heading and consumes both lines.
pub fn detect_setext_heading(line: &str, next: Option<&str>) -> Option<MarkdownHeading> {
    let text = line.trim();
    if text.is_empty() {
        return None;
    }

    let level = setext_underline_level(next?)?;
    Some(MarkdownHeading {
        level,
        text: text.to_string(),
        kind: HeadingKind::Setext,
    })
}

pub fn setext_underline_level(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    let fence_char = trimmed.chars().next()?;
    if !trimmed.chars().all(|ch| ch == fence_char) {
        return None;
    }

    match fence_char {
        '=' => Some(1),
        '-' => Some(2),
        _ => None,
    }
}

fn count_hashes(text: &str) -> usize {
    text.chars().take_while(|ch| *ch == '#').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_plain_and_bulleted_journal_headings() {
        let plain = detect_journal_heading("## Tasks").unwrap();
        assert_eq!(plain.level, 2);
        assert!(!plain.bullet_prefixed);

        let bulleted = detect_journal_heading("  - ### Notes").unwrap();
        assert_eq!(bulleted.level, 3);
        assert!(bulleted.bullet_prefixed);

        assert_eq!(detect_journal_heading("##Tight").unwrap().level, 2);
    }

    #[test]
    fn rejects_journal_non_headings() {
        assert!(detect_journal_heading("- item").is_none());
        assert!(detect_journal_heading("- #tag").is_none());
        assert!(detect_journal_heading("####### too deep").is_none());
        assert!(detect_journal_heading("").is_none());
    }

    #[test]
    fn parses_atx_heading_with_closing_sequence() {
        let heading = detect_atx_heading("### Heading **Text** ##").unwrap();
        assert_eq!(heading.level, 3);
        assert_eq!(heading.text, "Heading **Text**");
        assert_eq!(heading.kind, HeadingKind::Atx);
    }

    #[test]
    fn atx_keeps_hashes_glued_to_text() {
        let heading = detect_atx_heading("## Learning C#").unwrap();
        assert_eq!(heading.text, "Learning C#");
    }

    #[test]
    fn atx_requires_space_after_hashes() {
        assert!(detect_atx_heading("##Title").is_none());
        assert!(detect_atx_heading("#").is_none());
        assert!(detect_atx_heading("  ## Indented").is_none());
        assert_eq!(detect_atx_heading("## ").unwrap().text, "");
        assert_eq!(detect_atx_heading("# ##").unwrap().text, "");
    }

    #[test]
    fn parses_setext_heading() {
        let heading = detect_setext_heading("Heading two", Some("  ---  ")).unwrap();
        assert_eq!(heading.level, 2);
        assert_eq!(heading.text, "Heading two");
        assert_eq!(heading.kind, HeadingKind::Setext);

        assert_eq!(setext_underline_level("=").unwrap(), 1);
    }

    #[test]
    fn rejects_invalid_setext_underlines() {
        assert!(detect_setext_heading("Heading", Some("--=-")).is_none());
        assert!(detect_setext_heading("Heading", Some("")).is_none());
        assert!(detect_setext_heading("   ", Some("===")).is_none());
        assert!(detect_setext_heading("Heading", None).is_none());
    }
}
