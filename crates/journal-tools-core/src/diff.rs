use similar::TextDiff;

/// Unified diff between two versions of a file, labelled `a/<path>` and
/// `b/<path>`. `None` when nothing changed.
pub fn build_unified_diff(original: &str, modified: &str, path: &str) -> Option<String> {
    if original == modified {
        return None;
    }

    let diff = TextDiff::from_lines(original, modified);
    let header_old = format!("a/{path}");
    let header_new = format!("b/{path}");

    Some(
        diff.unified_diff()
            .context_radius(2)
            .header(&header_old, &header_new)
            .to_string(),
    )
}
