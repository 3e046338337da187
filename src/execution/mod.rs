//! Workflow Execution Module
//!
//! Runs resolved plans against the outside world.
//!
//! # Architecture
//!
//! - [`runner`]: Single external command execution in an explicit context
//! - [`engine`]: Step sequencing, macro expansion and fail-fast policy

pub mod engine;
pub mod runner;

pub use engine::{Engine, RunOutcome};
pub use runner::{CommandFailure, CommandRunner, ExecutionContext, ShellRunner};
