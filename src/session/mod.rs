//! Session identifiers.
//!
//! Every invocation is tagged with a [`SessionId`] issued by a
//! [`SessionCounter`] owned by the runner.

mod counter;
mod id;

pub use counter::SessionCounter;
pub use id::SessionId;
