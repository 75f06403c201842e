//! Single-line classification.

/// One line of the response body, classified by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLine<'a> {
    /// Empty or whitespace-only; terminates a pending record.
    Blank,
    /// `:`-prefixed keepalive or comment.
    Comment(&'a str),
    /// `name: value` line of a multi-field record.
    Field { name: &'a str, value: &'a str },
    /// A whole JSON value on one line.
    Json(&'a str),
}

/// Classify a line (without its line terminator).
///
/// A line is a record field when it starts with an identifier made of ASCII
/// letters, digits, `_` or `-` immediately followed by `:`. A line holding
/// only a field name (`data`) is that field with an empty value. JSON values
/// never take either shape, apart from the `true`, `false` and `null`
/// literals, so anything else is treated as a bare JSON line.
pub fn parse_frame_line(line: &str) -> FrameLine<'_> {
    if line.trim().is_empty() {
        return FrameLine::Blank;
    }

    if let Some(rest) = line.strip_prefix(':') {
        return FrameLine::Comment(rest.trim());
    }

    if let Some((name, value)) = line.split_once(':') {
        if is_field_name(name) {
            let value = value.strip_prefix(' ').unwrap_or(value);
            return FrameLine::Field { name, value };
        }
    }

    let trimmed = line.trim();
    if is_bare_field_name(trimmed) {
        return FrameLine::Field {
            name: trimmed,
            value: "",
        };
    }

    FrameLine::Json(trimmed)
}

fn is_bare_field_name(name: &str) -> bool {
    is_field_name(name)
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && !matches!(name, "true" | "false" | "null")
}

fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
