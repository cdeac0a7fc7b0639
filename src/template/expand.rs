//! Environment and glob expansion of rendered text.

use std::path::Path;

use globset::GlobBuilder;

use super::pattern::glob_tokens;
use crate::error::CmdrError;
use crate::Result;

/// Expand `$NAME` and `${NAME}` against the process environment.
///
/// Undefined variables expand to the empty string.
pub fn expand_env(text: &str) -> String {
    expand_env_with(text, |name| std::env::var(name).ok())
}

/// Expand variable references using `lookup` to resolve names.
pub fn expand_env_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match variable_name(after) {
            Some((name, consumed)) => {
                if !name.is_empty() {
                    out.push_str(&lookup(name).unwrap_or_default());
                }
                rest = &after[consumed..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_special_var(b: u8) -> bool {
    matches!(b, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || b.is_ascii_digit()
}

/// Parse the variable name following a `$`.
///
/// Returns the name and the number of bytes it occupies; an empty name with a
/// nonzero length means malformed braces that are swallowed. `None` leaves
/// the `$` as a literal.
fn variable_name(s: &str) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    match *bytes.first()? {
        b'{' => {
            if bytes.len() > 2 && is_special_var(bytes[1]) && bytes[2] == b'}' {
                return Some((&s[1..2], 3));
            }
            match s[1..].find('}') {
                Some(0) => Some(("", 2)),
                Some(i) => Some((&s[1..1 + i], i + 2)),
                None => Some(("", 1)),
            }
        }
        b if is_special_var(b) => Some((&s[..1], 1)),
        _ => {
            let len = bytes
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            (len > 0).then(|| (&s[..len], len))
        }
    }
}

/// Replace every glob token in `text` with its matches inside `base`.
pub fn expand_globs(text: &str, base: &Path) -> Result<String> {
    let tokens = glob_tokens(text);
    if tokens.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in tokens {
        let matches = match_glob(&text[range.clone()], base)?;
        out.push_str(&text[last..range.start]);
        out.push_str(&matches.join(" "));
        last = range.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Entries of `base` whose names match `pattern`, sorted.
///
/// An empty result is an error: a glob that matches nothing would otherwise
/// reach the child as a literal `*` argument.
pub fn match_glob(pattern: &str, base: &Path) -> Result<Vec<String>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| CmdrError::Glob(e.to_string()))?
        .compile_matcher();

    let mut matches = Vec::new();
    for entry in std::fs::read_dir(base)? {
        let entry = entry?;
        let name = entry.file_name();
        // Non-UTF-8 names cannot be carried in a text command line.
        let Some(name) = name.to_str() else {
            continue;
        };
        if matcher.is_match(name) {
            matches.push(name.to_string());
        }
    }

    if matches.is_empty() {
        return Err(CmdrError::NoSuchFile(pattern.to_string()));
    }
    matches.sort();
    Ok(matches)
}
