//! Session identifier type.

use std::fmt;

use serde::Serialize;

/// Identifier of a single command invocation.
///
/// Issued by a [`SessionCounter`](super::SessionCounter), starting at 1 and
/// strictly increasing. The zero value marks an invocation that failed before
/// an identifier was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Identifier of an invocation that never reached the spawn step.
    pub const UNASSIGNED: SessionId = SessionId(0);

    /// Get the raw value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Wrap a raw value issued by a [`SessionCounter`](super::SessionCounter).
    pub fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Whether this identifier was issued by a counter.
    pub fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
