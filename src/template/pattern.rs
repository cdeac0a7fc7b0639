//! Token matchers for placeholders and glob words.

use std::ops::Range;

/// Opening delimiter of a placeholder.
pub const PLACEHOLDER_OPEN: &str = "{{";
/// Closing delimiter of a placeholder.
pub const PLACEHOLDER_CLOSE: &str = "}}";
/// Character that turns a word into a glob token.
pub const GLOB_WILDCARD: char = '*';

/// Find the first unresolved placeholder: `{{` followed by one or more ASCII
/// uppercase letters and `}}`.
///
/// Returns the byte range of the whole placeholder, delimiters included.
pub fn find_placeholder(text: &str) -> Option<Range<usize>> {
    let mut from = 0;
    while let Some(offset) = text[from..].find(PLACEHOLDER_OPEN) {
        let start = from + offset;
        let name_start = start + PLACEHOLDER_OPEN.len();
        let name_len = text[name_start..]
            .bytes()
            .take_while(u8::is_ascii_uppercase)
            .count();
        let name_end = name_start + name_len;

        if name_len > 0 && text[name_end..].starts_with(PLACEHOLDER_CLOSE) {
            return Some(start..name_end + PLACEHOLDER_CLOSE.len());
        }
        from = start + 1;
    }
    None
}

/// Whether any unresolved placeholder remains in `text`.
pub fn contains_placeholder(text: &str) -> bool {
    find_placeholder(text).is_some()
}

/// Characters allowed inside a glob token.
pub fn is_glob_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | GLOB_WILDCARD)
}

/// Byte ranges of every glob token in `text`: maximal runs of
/// [`is_glob_char`] characters containing at least one wildcard.
pub fn glob_tokens(text: &str) -> Vec<Range<usize>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut wildcard = false;

    for (i, c) in text.char_indices() {
        if is_glob_char(c) {
            start.get_or_insert(i);
            wildcard |= c == GLOB_WILDCARD;
            continue;
        }
        if let Some(s) = start.take() {
            if wildcard {
                tokens.push(s..i);
            }
        }
        wildcard = false;
    }
    if let Some(s) = start {
        if wildcard {
            tokens.push(s..text.len());
        }
    }
    tokens
}
