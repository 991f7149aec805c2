//! Slash-delimited item paths.
//!
//! A backslash escapes the next character, so `"a\\/b"` names a single item
//! labelled `a/b`. Empty segments (leading, trailing or doubled slashes) are
//! skipped.

use smallvec::SmallVec;

pub(crate) type Segments = SmallVec<[String; 8]>;

/// Splits a path into unescaped label segments.
pub(crate) fn split(path: &str) -> Segments {
    let mut segments = Segments::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '/' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Appends `label` to `out`, escaping separators and backslashes.
pub(crate) fn push_escaped(out: &mut String, label: &str) {
    for ch in label.chars() {
        if matches!(ch, '/' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
}
