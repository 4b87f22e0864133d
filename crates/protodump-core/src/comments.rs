//! Comment formatting shared by every entity in the report.

/// Marker that distinguishes detached comment blocks from leading ones
pub const DETACHED_MARKER: &str = "//!";

/// Separator that replaces newlines inside a trailing comment
pub const TRAILING_SEPARATOR: &str = "|";

/// Renders a raw comment block back into `//` line comments.
///
/// One trailing newline is dropped before splitting, so `" a\n b\n"` becomes
/// `"// a\n// b\n"`. An empty block renders as an empty string.
pub fn render_block(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    let mut out = String::with_capacity(body.len() + 8);
    for line in body.split('\n') {
        out.push_str("//");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Formats detached leading blocks as a single multi-line string.
///
/// Returns `None` when there are no blocks.
pub fn format_detached(blocks: &[String]) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }
    let rendered: Vec<String> = blocks
        .iter()
        .map(|block| {
            let text = render_block(block);
            let text = text.trim();
            format!("{}{}", DETACHED_MARKER, text.strip_prefix("//").unwrap_or(text))
        })
        .collect();
    Some(rendered.join("\n"))
}

/// Formats the leading block, trimmed of surrounding whitespace
pub fn format_leading(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    Some(render_block(raw).trim().to_string())
}

/// Folds a trailing comment onto one line
pub fn format_trailing(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let body = raw.strip_suffix('\n').unwrap_or(raw);
    Some(body.split('\n').collect::<Vec<_>>().join(TRAILING_SEPARATOR))
}
