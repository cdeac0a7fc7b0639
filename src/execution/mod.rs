//! Command execution engine.
//!
//! This module turns a [`CommandTemplate`] plus parameters into a child
//! process and an [`Invocation`] record:
//! - Synchronous runs that return the record directly
//! - Asynchronous runs that deliver it over a channel
//! - Detached background starts that only report the pid
//!
//! # Example
//!
//! ```no_run
//! use cmdr::execution::{CommandTemplate, Runner};
//! use cmdr::template::Param;
//!
//! let runner = Runner::new();
//! let ls = CommandTemplate::new("ls").args("-l {{WHAT}}");
//! let result = runner.run(&ls, &[Param::named("WHAT", "*.rs")]).unwrap();
//! println!("{}", result);
//! ```

mod command;
mod executor;
mod launcher;
mod result;

pub use command::CommandTemplate;
pub use executor::{terminate, Launched, Runner};
pub use launcher::{find_executable, resolve_identity, LaunchRequest, NativeLauncher, ProcessLauncher};
pub use result::Invocation;
