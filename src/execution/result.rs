//! Invocation result record.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use crate::session::SessionId;

/// Everything recorded about one command execution.
///
/// Fields are filled in as the run progresses, so a record returned with an
/// error may be partial: a zero `session_id` means the run never reached the
/// spawn step, a zero `pid` that no process was started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Invocation {
    /// Identifier issued for this run.
    pub session_id: SessionId,
    /// Process ID of the child.
    pub pid: u32,
    /// Exit status, or -1 if the child was killed by a signal.
    pub exit_code: i32,
    /// Resolved executable followed by the rendered arguments.
    pub command_line: String,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// CPU time spent in user mode.
    pub user_time: Duration,
    /// CPU time spent in kernel mode.
    pub system_time: Duration,
    /// When the child was started.
    pub started: Option<SystemTime>,
    /// When the child was reaped.
    pub finished: Option<SystemTime>,
}

impl Invocation {
    /// Check if the command exited with status 0.
    pub fn success(&self) -> bool {
        self.finished.is_some() && self.exit_code == 0
    }

    /// Wall-clock time between start and finish.
    pub fn wall_time(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(started), Some(finished)) => {
                finished.duration_since(started).unwrap_or_default()
            }
            _ => Duration::ZERO,
        }
    }

    /// Get stdout as string, trimmed.
    pub fn output_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stdout lines.
    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "CMD: {}", self.command_line)?;
        writeln!(f, "SID: {}", self.session_id)?;
        writeln!(f, "PID: {}", self.pid)?;
        writeln!(f, "RC : {}", self.exit_code)?;
        writeln!(f, "OUT: {}", self.stdout)?;
        writeln!(f, "ERR: {}", self.stderr)?;
        writeln!(f, "SYS: {:?}", self.system_time)?;
        writeln!(f, "USR: {:?}", self.user_time)?;
        writeln!(f, "CLK: {:?}", self.wall_time())
    }
}
