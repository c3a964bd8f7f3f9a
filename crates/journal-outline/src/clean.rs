//! Empty-section removal for Logseq journal pages.
//!
//! A section survives only when something other than further headings lives
//! beneath it. Everything outside a section is passed through untouched.

use tracing::debug;

use crate::line::classify_lines;
use crate::section::{build_sections, OutputUnit, Section};

/// Returns `true` when `section` owns at least one deeper, non-blank line that
/// is not itself a heading.
pub fn has_nested_content(section: &Section) -> bool {
    let mut has_content = false;
    let mut has_only_headings = true;

    for (line, indent) in &section.content {
        if line.is_blank() {
            continue;
        }

        if *indent > section.indent_level {
            has_content = true;

            if !line.is_heading() {
                has_only_headings = false;
                break;
            }
        }
    }

    has_content && !has_only_headings
}

/// Appends the surviving lines of `section` to `out`.
pub fn render_section<'a>(section: &'a Section, out: &mut Vec<&'a str>) {
    if has_nested_content(section) {
        out.extend(section.lines().map(|line| line.raw.as_str()));
        return;
    }

    debug!(
        line = section.heading.number,
        heading = %section.heading.raw.trim(),
        "dropping empty section"
    );
    out.extend(
        section
            .content
            .iter()
            .filter(|(_, indent)| *indent <= section.indent_level)
            .map(|(line, _)| line.raw.as_str()),
    );
}

pub fn clean_units(units: &[OutputUnit]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for unit in units {
        match unit {
            OutputUnit::Passthrough(line) => kept.push(&line.raw),
            OutputUnit::Section(section) => render_section(section, &mut kept),
        }
    }
    kept.join("\n")
}

/// Remove every section without nested content from a journal page.
pub fn clean_journal_content(content: &str) -> String {
    let units = build_sections(classify_lines(content));
    clean_units(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::classify;

    fn section(heading: &str, content: &[&str]) -> Section {
        let heading = classify(heading, 1);
        Section {
            indent_level: heading.indent,
            heading,
            content: content
                .iter()
                .enumerate()
                .map(|(idx, raw)| {
                    let line = classify(raw, idx + 2);
                    let indent = line.indent;
                    (line, indent)
                })
                .collect(),
        }
    }

    #[test]
    fn blank_lines_do_not_count_as_content() {
        assert!(!has_nested_content(&section("## A", &["   ", "\t"])));
    }

    #[test]
    fn headings_alone_do_not_count_as_content() {
        assert!(!has_nested_content(&section("## A", &["  ### B", "    #### C"])));
    }

    #[test]
    fn first_non_heading_line_decides() {
        assert!(has_nested_content(&section(
            "## A",
            &["  ### B", "    text", "  ### C"]
        )));
    }

    #[test]
    fn empty_section_keeps_shallower_content() {
        let mut built = section("  - ## A", &[]);
        built.content.push((classify("  sibling", 2), 2));
        let mut out = Vec::new();
        render_section(&built, &mut out);
        assert_eq!(out, vec!["  sibling"]);
    }
}
