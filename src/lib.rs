//! # cmdr
//!
//! Parameterized command templates with safe, captured process execution.
//!
//! A [`CommandTemplate`] pairs an executable with an argument template such
//! as `-l {{WHAT}} [{{EVER}}]`. The [`Runner`] renders it with caller-supplied
//! [`Param`]s, starts the program directly (no shell), and records PID, exit
//! code, captured output and CPU/wall timing in an [`Invocation`].
//!
//! ## Features
//!
//! - **Template rendering**: placeholders, optional fragments, environment
//!   and glob expansion, with errors for missing parameters or empty globs
//! - **Sync and async runs**: direct return, or delivery over a tokio channel
//! - **Impersonation**: optional uid switch when running as root
//! - **Session ids**: strictly increasing identifier per invocation
//!
//! ## Quick Start
//!
//! ```no_run
//! use cmdr::{CommandTemplate, Param, Runner};
//!
//! #[tokio::main]
//! async fn main() -> cmdr::Result<()> {
//!     cmdr::logging::try_init().ok();
//!
//!     let runner = Runner::new();
//!     let ls = CommandTemplate::new("ls").args("-l {{WHAT}}");
//!
//!     let result = runner.run(&ls, &[Param::named("WHAT", "*.toml")])?;
//!     println!("{}", result);
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(1);
//!     runner.run_async(&ls.args("-a"), &[], tx).await?;
//!     if let Some(result) = rx.recv().await {
//!         println!("session {} exited with {}", result.session_id, result.exit_code);
//!     }
//!     Ok(())
//! }
//! ```

#[cfg(not(unix))]
compile_error!("cmdr supports unix platforms only");

pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod session;
pub mod template;

// Re-export commonly used types
pub use error::{CmdrError, Result, RunError};
pub use execution::{CommandTemplate, Invocation, Launched, ProcessLauncher, Runner};
pub use session::{SessionCounter, SessionId};
pub use template::{render, Param};
