mod clean;
mod convert;
mod heading;
mod line;
mod section;

pub use clean::{clean_journal_content, clean_units, has_nested_content, render_section};
pub use convert::{
    build_outline, convert_to_outline, is_property_line, parse_markdown_blocks, render_outline,
    Block, ConvertOptions, EntryKind, OutlineEntry, ParagraphMode, ParseParagraphModeError,
};
pub use heading::{
    detect_atx_heading, detect_journal_heading, detect_setext_heading, setext_underline_level,
    HeadingKind, HeadingMark, MarkdownHeading,
};
pub use line::{classify, classify_lines, indent_width, Line};
pub use section::{build_sections, OutputUnit, Section, SectionBuilder};
