//! Markdown to Logseq outline conversion.
//!
//! Headings become bullets indented by `level - 1`; paragraph content is
//! nested one level below the most recent heading.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::heading::{detect_atx_heading, detect_setext_heading};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParagraphMode {
    /// Every non-blank line is its own paragraph.
    #[default]
    Lines,
    /// Consecutive non-blank lines are joined into one paragraph.
    Blocks,
}

impl ParagraphMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParagraphMode::Lines => "lines",
            ParagraphMode::Blocks => "blocks",
        }
    }
}

impl fmt::Display for ParagraphMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("must be 'lines' or 'blocks' (received '{0}')")]
pub struct ParseParagraphModeError(String);

impl FromStr for ParagraphMode {
    type Err = ParseParagraphModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "lines" => Ok(ParagraphMode::Lines),
            "blocks" => Ok(ParagraphMode::Blocks),
            other => Err(ParseParagraphModeError(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub paragraph_mode: ParagraphMode,
    pub indent_width: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            paragraph_mode: ParagraphMode::Lines,
            indent_width: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    Paragraph(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Heading,
    Bullet,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub indent: usize,
    pub text: String,
    pub kind: EntryKind,
}

impl OutlineEntry {
    pub fn render(&self, indent_width: usize) -> String {
        let indent = " ".repeat(self.indent * indent_width);
        match self.kind {
            EntryKind::Property => format!("{indent}{}", self.text),
            EntryKind::Heading | EntryKind::Bullet => format!("{indent}- {}", self.text),
        }
    }
}

/// Lines waiting to be flushed as one paragraph in `blocks` mode.
#[derive(Debug, Default)]
struct ParagraphAccumulator {
    lines: Vec<String>,
}

impl ParagraphAccumulator {
    fn push(&mut self, line: &str) {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.lines.push(trimmed.to_string());
        }
    }

    fn flush_into(&mut self, blocks: &mut Vec<Block>) {
        if self.lines.is_empty() {
            return;
        }
        blocks.push(Block::Paragraph(self.lines.join(" ")));
        self.lines.clear();
    }
}

pub fn parse_markdown_blocks(markdown: &str, mode: ParagraphMode) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut pending = ParagraphAccumulator::default();
    let mut idx = 0usize;

    while idx < lines.len() {
        let line = lines[idx];

        if line.trim().is_empty() {
            pending.flush_into(&mut blocks);
            idx += 1;
            continue;
        }

        if let Some(heading) = detect_atx_heading(line) {
            pending.flush_into(&mut blocks);
            blocks.push(Block::Heading {
                level: heading.level,
                text: heading.text,
            });
            idx += 1;
            continue;
        }

        if let Some(heading) = detect_setext_heading(line, lines.get(idx + 1).copied()) {
            pending.flush_into(&mut blocks);
            blocks.push(Block::Heading {
                level: heading.level,
                text: heading.text,
            });
            idx += 2;
            continue;
        }

        match mode {
            ParagraphMode::Lines => blocks.push(Block::Paragraph(line.trim().to_string())),
            ParagraphMode::Blocks => pending.push(line),
        }
        idx += 1;
    }

    pending.flush_into(&mut blocks);
    blocks
}

pub fn build_outline(blocks: &[Block]) -> Vec<OutlineEntry> {
    let mut entries = Vec::with_capacity(blocks.len());
    let mut current_heading_level = 0usize;

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                entries.push(OutlineEntry {
                    indent: level.saturating_sub(1),
                    text: format!("{} {text}", "#".repeat(*level)),
                    kind: EntryKind::Heading,
                });
                current_heading_level = *level;
            }
            Block::Paragraph(text) => {
                entries.push(paragraph_entry(text, current_heading_level));
            }
        }
    }

    entries
}

fn paragraph_entry(text: &str, base_indent: usize) -> OutlineEntry {
    let bullet_body = text.strip_prefix("- ").map(str::trim_start);
    let candidate = bullet_body.unwrap_or(text);

    if is_property_line(candidate) {
        return OutlineEntry {
            indent: base_indent,
            text: candidate.to_string(),
            kind: EntryKind::Property,
        };
    }

    // An existing bullet under a heading becomes a child of the heading's content.
    let indent = match bullet_body {
        Some(_) if base_indent > 0 => base_indent + 1,
        _ => base_indent,
    };

    OutlineEntry {
        indent,
        text: candidate.to_string(),
        kind: EntryKind::Bullet,
    }
}

/// `key:: value` where the key starts with `[A-Za-z0-9_-]` and continues with
/// `[A-Za-z0-9 _-]`.
pub fn is_property_line(text: &str) -> bool {
    let Some((key, _)) = text.split_once("::") else {
        return false;
    };

    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    is_key_char(first) && chars.all(|ch| ch == ' ' || is_key_char(ch))
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub fn render_outline(entries: &[OutlineEntry], indent_width: usize) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut output = entries
        .iter()
        .map(|entry| entry.render(indent_width))
        .collect::<Vec<_>>()
        .join("\n");
    output.push('\n');
    output
}

pub fn convert_to_outline(markdown: &str, options: &ConvertOptions) -> String {
    let blocks = parse_markdown_blocks(markdown, options.paragraph_mode);
    render_outline(&build_outline(&blocks), options.indent_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paragraph_mode_names() {
        assert_eq!("blocks".parse::<ParagraphMode>(), Ok(ParagraphMode::Blocks));
        assert_eq!("lines".parse::<ParagraphMode>(), Ok(ParagraphMode::Lines));

        let err = "sentences".parse::<ParagraphMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "must be 'lines' or 'blocks' (received 'sentences')"
        );
    }

    #[test]
    fn detects_property_lines() {
        assert!(is_property_line("due:: 2025-01-01"));
        assert!(is_property_line("_private key:: x"));
        assert!(is_property_line("-x::"));
        assert!(!is_property_line(" due:: 2025"));
        assert!(!is_property_line("a.b:: c"));
        assert!(!is_property_line("note: single colon"));
    }

    #[test]
    fn blocks_mode_joins_until_blank_line() {
        let blocks = parse_markdown_blocks("  one\ntwo  \n\nthree", ParagraphMode::Blocks);
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("one two".into()),
                Block::Paragraph("three".into()),
            ]
        );
    }

    #[test]
    fn heading_flushes_pending_paragraph() {
        let blocks = parse_markdown_blocks("alpha\nbeta\n# Head\ngamma", ParagraphMode::Blocks);
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph("alpha beta".into()),
                Block::Heading {
                    level: 1,
                    text: "Head".into(),
                },
                Block::Paragraph("gamma".into()),
            ]
        );
    }

    #[test]
    fn setext_underline_is_consumed() {
        let blocks = parse_markdown_blocks("Title\n---\nbody", ParagraphMode::Lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 2,
                text: "Title".into(),
            }
        );
    }

    #[test]
    fn root_bullet_stays_at_top_level() {
        let entry = paragraph_entry("- item", 0);
        assert_eq!(entry.indent, 0);
        assert_eq!(entry.render(2), "- item");
    }

    #[test]
    fn bullet_under_heading_is_deepened() {
        let entry = paragraph_entry("- item", 2);
        assert_eq!(entry.render(2), "      - item");
    }

    #[test]
    fn bulleted_property_drops_the_bullet() {
        let entry = paragraph_entry("- tags:: reading", 1);
        assert_eq!(entry.kind, EntryKind::Property);
        assert_eq!(entry.render(2), "  tags:: reading");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(convert_to_outline("", &ConvertOptions::default()), "");
        assert_eq!(convert_to_outline("\n  \n", &ConvertOptions::default()), "");
    }
}
