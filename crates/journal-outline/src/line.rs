use crate::heading::{detect_journal_heading, HeadingMark};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub raw: String,
    pub number: usize,
    pub indent: usize,
    pub heading: Option<HeadingMark>,
}

impl Line {
    pub fn is_heading(&self) -> bool {
        self.heading.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// Classify a single journal line. `number` is the 1-based input position.
pub fn classify(raw: &str, number: usize) -> Line {
    Line {
        raw: raw.to_string(),
        number,
        indent: indent_width(raw),
        heading: detect_journal_heading(raw),
    }
}

/// Split on `\n` only so that joining the raw lines with `\n` reproduces the input.
pub fn classify_lines(content: &str) -> Vec<Line> {
    content
        .split('\n')
        .enumerate()
        .map(|(idx, raw)| classify(raw, idx + 1))
        .collect()
}

/// Leading whitespace characters, one unit each. Tabs are not expanded.
pub fn indent_width(line: &str) -> usize {
    let trimmed = line.trim_start();
    line[..line.len() - trimmed.len()].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tabs_and_spaces_as_single_units() {
        assert_eq!(indent_width("\t\t- item"), 2);
        assert_eq!(indent_width("  \t- item"), 3);
        assert_eq!(indent_width("- item"), 0);
    }

    #[test]
    fn whitespace_only_line_is_fully_indented() {
        assert_eq!(indent_width("    "), 4);
        assert_eq!(indent_width(""), 0);
    }

    #[test]
    fn classify_lines_keeps_trailing_empty_line() {
        let lines = classify_lines("## A\n  body\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].raw, "");
        assert_eq!(lines[2].number, 3);
        assert!(lines[0].is_heading());
        assert_eq!(lines[1].indent, 2);
    }

    #[test]
    fn classify_records_bulleted_heading_mark() {
        let line = classify("\t- ### Notes", 4);
        let mark = line.heading.expect("heading");
        assert_eq!(mark.level, 3);
        assert!(mark.bullet_prefixed);
        assert_eq!(line.indent, 1);
        assert_eq!(line.number, 4);
    }
}
