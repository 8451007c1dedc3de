//! Small string helpers for the chat wire format and for display.

/// Escapes text for safe display in the HTML chat view.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverses IRCv3 tag value escaping (`\s`, `\:`, `\\`, `\r`, `\n`).
/// An unknown escape keeps the escaped character; a trailing lone `\` is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            unescaped.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => unescaped.push(' '),
            Some(':') => unescaped.push(';'),
            Some('\\') => unescaped.push('\\'),
            Some('r') => unescaped.push('\r'),
            Some('n') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => {}
        }
    }
    unescaped
}

/// Inclusive character range `[start, end]` of `text`, clamped to its length.
pub fn char_range(text: &str, start: usize, end: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let from = indices.nth(start).unwrap_or(text.len());
    let to = if end >= start {
        indices.nth(end - start).unwrap_or(text.len())
    } else {
        from
    };
    &text[from..to]
}
