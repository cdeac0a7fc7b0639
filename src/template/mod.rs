//! Argument template rendering.
//!
//! A template is plain text with two kinds of markup:
//!
//! - `{{NAME}}` placeholders, replaced by named [`Param`]s;
//! - `[...]` optional fragments, kept only when every placeholder was supplied.
//!
//! Rendering runs in a fixed order: named substitution, bare append, optional
//! fragments, completeness check, environment expansion, glob expansion.
//! Expansion happens last so an incomplete template never reaches the
//! filesystem.
//!
//! # Example
//!
//! ```no_run
//! use cmdr::template::{render, Param};
//!
//! let args = render("-l {{WHAT}} [{{EVER}}]", &[Param::named("WHAT", "*.rs")]).unwrap();
//! println!("{}", args);
//! ```

mod expand;
mod fragment;
mod pattern;

use std::path::Path;

use crate::error::CmdrError;
use crate::Result;

pub use expand::{expand_env, expand_env_with, expand_globs, match_glob};
pub use fragment::resolve_optional;
pub use pattern::{
    contains_placeholder, find_placeholder, glob_tokens, is_glob_char, GLOB_WILDCARD,
    PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN,
};

/// A value supplied for one invocation.
///
/// A named parameter fills every `{{NAME}}` placeholder; a bare parameter
/// (empty name) is appended to the argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Placeholder name, or empty for a bare trailing argument.
    pub name: String,
    /// Substituted or appended value.
    pub value: String,
}

impl Param {
    /// Create a parameter for the `{{name}}` placeholder.
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a bare parameter appended after the rendered template.
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
        }
    }

    /// Whether this parameter is appended rather than substituted.
    pub fn is_bare(&self) -> bool {
        self.name.is_empty()
    }
}

/// Render `template`, expanding globs relative to the current directory.
pub fn render(template: &str, params: &[Param]) -> Result<String> {
    render_in(template, params, Path::new("."))
}

/// Render `template`, expanding globs relative to `base`.
pub fn render_in(template: &str, params: &[Param], base: &Path) -> Result<String> {
    let text = substitute(template, params);
    let text = resolve_optional(text)?;

    if let Some(range) = find_placeholder(&text) {
        return Err(CmdrError::Incomplete(text[range].to_string()));
    }

    let text = expand_env(&text);
    expand_globs(&text, base)
}

/// Named substitution followed by bare append, in supplied order.
fn substitute(template: &str, params: &[Param]) -> String {
    let mut text = template.to_string();

    for param in params.iter().filter(|p| !p.is_bare()) {
        let placeholder = format!("{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}", param.name);
        text = text.replace(&placeholder, &param.value);
    }
    for param in params.iter().filter(|p| p.is_bare()) {
        text.push(' ');
        text.push_str(&param.value);
    }
    text
}
