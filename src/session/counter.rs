//! Session identifier generation.

use std::sync::Mutex;

use super::SessionId;
use crate::error::CmdrError;
use crate::Result;

/// Issues strictly increasing session identifiers.
///
/// The lock is held only for the increment, so identifiers give a total order
/// of invocation starts across every caller sharing the counter. Nothing is
/// persisted; uniqueness holds for the lifetime of the counter.
#[derive(Debug, Default)]
pub struct SessionCounter {
    last: Mutex<i64>,
}

impl SessionCounter {
    /// Create a counter whose first identifier is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identifier.
    pub fn next(&self) -> Result<SessionId> {
        let mut last = self.last.lock().map_err(|_| CmdrError::LockPoisoned)?;
        *last += 1;
        Ok(SessionId::from_raw(*last))
    }

    /// The most recently issued identifier, or `UNASSIGNED` if none yet.
    pub fn last(&self) -> Result<SessionId> {
        let last = self.last.lock().map_err(|_| CmdrError::LockPoisoned)?;
        Ok(SessionId::from_raw(*last))
    }
}
