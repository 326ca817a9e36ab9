//! Text measuring helpers

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate to `max_width` display columns, ending in "..." when cut
pub fn truncate_ellipsis(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let budget = max_width - 3;
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str("...");
    out
}

/// Word-wrap plain text to `max_width` columns, keeping explicit newlines
pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let width = max_width.max(1);
    let mut lines = Vec::new();
    for paragraph in s.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(
            textwrap::wrap(paragraph, width)
                .into_iter()
                .map(|line| line.into_owned()),
        );
    }
    lines
}
