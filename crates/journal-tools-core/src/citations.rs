//! Removal of Perplexity-style source citations such as
//! `[autoscout24+2](https://...)` from pasted answers.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static SOURCE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"\[([a-zA-Z0-9_-]+(?:\+\d+)?)\]\([^)]+\)")
        .case_insensitive(true)
        .build()
        .expect("source link pattern is valid")
});
static INVISIBLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{200B}-\u{200F}\u{FEFF}\u{2060}]").expect("valid pattern"));
static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("valid pattern"));
static TRAILING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m) +$").expect("valid pattern"));

pub fn clean_citations(text: &str) -> String {
    let text = SOURCE_LINK_RE.replace_all(text, "");
    let text = INVISIBLE_RE.replace_all(&text, "");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    TRAILING_SPACE_RE.replace_all(&text, "").into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedLine {
    /// 1-based.
    pub number: usize,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub changes: Vec<ChangedLine>,
    pub original_line_count: usize,
}

/// Line-by-line comparison of the two texts, pairing lines by position.
/// Lines past the end of the shorter text are not reported.
pub fn preview(original: &str, cleaned: &str) -> Option<Preview> {
    if original == cleaned {
        return None;
    }

    let changes = original
        .lines()
        .zip(cleaned.lines())
        .enumerate()
        .filter(|(_, (before, after))| before != after)
        .map(|(index, (before, after))| ChangedLine {
            number: index + 1,
            before: before.to_string(),
            after: after.to_string(),
        })
        .collect();

    Some(Preview {
        changes,
        original_line_count: original.lines().count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_source_links() {
        let input = "Prices vary [autoscout24+2](https://www.autoscout24.de/a) by region [weinrank](http://weinrank.de).\n";
        assert_eq!(clean_citations(input), "Prices vary by region .\n");
    }

    #[test]
    fn keeps_links_with_spaces_in_text() {
        let input = "See [the docs](https://example.com) for more.";
        assert_eq!(clean_citations(input), input);
    }

    #[test]
    fn strips_invisible_characters_and_trailing_spaces() {
        let input = "alpha\u{200B} [src](http://x)\u{FEFF}  \nbeta\u{2060}   gamma  ";
        assert_eq!(clean_citations(input), "alpha\nbeta gamma");
    }

    #[test]
    fn matches_mixed_case_names() {
        assert_eq!(clean_citations("x [Fahrschule-Braun](u) y"), "x y");
    }

    #[test]
    fn preview_pairs_changed_lines() {
        let original = "one [a](u)\ntwo\nthree [b+1](v)";
        let cleaned = clean_citations(original);
        let preview = preview(original, &cleaned).expect("changes");

        assert_eq!(preview.original_line_count, 3);
        assert_eq!(
            preview.changes,
            vec![
                ChangedLine {
                    number: 1,
                    before: "one [a](u)".to_string(),
                    after: "one".to_string(),
                },
                ChangedLine {
                    number: 3,
                    before: "three [b+1](v)".to_string(),
                    after: "three".to_string(),
                },
            ]
        );
    }

    #[test]
    fn preview_is_none_without_changes() {
        assert!(preview("plain", "plain").is_none());
    }
}
