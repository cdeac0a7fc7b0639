//! Error types for cmdr.

use thiserror::Error;

use crate::execution::Invocation;

/// Main error type for cmdr operations.
#[derive(Error, Debug)]
pub enum CmdrError {
    /// Optional-fragment brackets are unbalanced.
    #[error("invalid command syntax")]
    Syntax,

    /// A required placeholder was left without a value.
    #[error("missing required parameter: {0}")]
    Incomplete(String),

    /// A glob token matched nothing.
    #[error("no such file or directory: {0}")]
    NoSuchFile(String),

    /// The executable could not be found on the search path.
    #[error("executable not found: {0}: no such file or directory")]
    ExecutableNotFound(String),

    /// A glob token could not be compiled into a pattern.
    #[error("invalid glob pattern: {0}")]
    Glob(String),

    /// Impersonation was requested by a process without superuser rights.
    #[error("must be run as root")]
    MustBeRoot,

    /// The impersonation user could not be resolved.
    #[error("user lookup failed for '{user}': {reason}")]
    UserLookup { user: String, reason: String },

    /// The child process could not be started.
    #[error("failed to spawn {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while waiting on the child or draining its pipes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The delivery channel was closed before the result was sent.
    #[error("channel closed")]
    ChannelClosed,

    /// The background waiting task failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl CmdrError {
    /// True for both "no such file" flavours: empty glob and missing executable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchFile(_) | Self::ExecutableNotFound(_))
    }
}

/// Convenience Result type for cmdr operations.
pub type Result<T> = std::result::Result<T, CmdrError>;

/// A failed run, carrying whatever the invocation had recorded before the
/// failing step.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct RunError {
    /// Partially populated invocation record.
    pub invocation: Invocation,
    /// The step that aborted the run.
    #[source]
    pub error: CmdrError,
}

impl RunError {
    pub(crate) fn new(invocation: Invocation, error: CmdrError) -> Self {
        Self { invocation, error }
    }
}

impl From<RunError> for CmdrError {
    fn from(err: RunError) -> Self {
        err.error
    }
}
