//! Worker tasks that back the runtime orchestration.
//!
//! The command worker serves [`crate::RuntimeHandle`] requests, while the
//! auto-run worker alternates generation and execution on its own.

mod auto_run;
mod command;

pub use auto_run::AutoRunWorker;
pub use command::{Command, CommandWorker};
