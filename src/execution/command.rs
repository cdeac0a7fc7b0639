//! Command template descriptor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A reusable description of an external program invocation.
///
/// The runner never mutates a template; the same value can be run any number
/// of times with different parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTemplate {
    /// Executable name or path, resolved against `PATH` when it has no `/`.
    pub path: String,
    /// Argument template with `{{NAME}}` placeholders and `[...]` fragments.
    pub args: String,
    /// Working directory for the child (and base for glob expansion).
    pub working_dir: Option<PathBuf>,
    /// User the child should run as; requires a superuser caller.
    pub user: Option<String>,
    /// Whether callers should deliver the result asynchronously.
    #[serde(rename = "async")]
    pub asynchronous: bool,
}

impl CommandTemplate {
    /// Create a template for the given executable with no arguments.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the argument template.
    pub fn args(mut self, template: impl Into<String>) -> Self {
        self.args = template.into();
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Run the child as another user.
    pub fn user(mut self, name: impl Into<String>) -> Self {
        self.user = Some(name.into());
        self
    }

    /// Select asynchronous delivery.
    pub fn asynchronous(mut self, enabled: bool) -> Self {
        self.asynchronous = enabled;
        self
    }
}
