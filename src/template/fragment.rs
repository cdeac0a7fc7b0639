//! Optional `[...]` fragment resolution.

use super::pattern::contains_placeholder;
use crate::error::CmdrError;
use crate::Result;

const FRAGMENT_OPEN: u8 = b'[';
const FRAGMENT_CLOSE: u8 = b']';

/// Resolve every optional fragment in `text`.
///
/// The leftmost `[` is paired with its matching `]`, counting nested
/// brackets. While any unresolved placeholder remains anywhere in the text,
/// that whole fragment is dropped with its brackets; otherwise only its outer
/// brackets are removed and any nested fragments are resolved in turn.
///
/// Note that the placeholder test is global, so one missing parameter drops
/// every fragment, including ones that do not mention it.
pub fn resolve_optional(mut text: String) -> Result<String> {
    loop {
        let Some(start) = text.bytes().position(|b| b == FRAGMENT_OPEN) else {
            if text.bytes().any(|b| b == FRAGMENT_CLOSE) {
                return Err(CmdrError::Syntax);
            }
            return Ok(text);
        };
        if text.as_bytes()[..start].contains(&FRAGMENT_CLOSE) {
            return Err(CmdrError::Syntax);
        }
        let end = matching_close(&text, start).ok_or(CmdrError::Syntax)?;

        if contains_placeholder(&text) {
            text.replace_range(start..=end, "");
        } else {
            text.remove(end);
            text.remove(start);
        }
    }
}

/// Index of the `]` closing the `[` at `start`.
fn matching_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(start) {
        match b {
            FRAGMENT_OPEN => depth += 1,
            FRAGMENT_CLOSE => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
