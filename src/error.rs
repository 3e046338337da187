//! Session-level errors.
//!
//! Everything here ends the session before (or instead of) a workflow
//! run and makes the process exit non-zero. Failed steps are not errors;
//! they are reported through [`RunOutcome`](crate::execution::RunOutcome).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::{ConfigError, PlanError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    ConfigLoad(#[from] ConfigError),

    #[error("Git is not installed or not in your PATH")]
    GitUnavailable,

    #[error("Could not determine current Git branch. Are you in a Git repository?")]
    BranchResolution,

    #[error("No workflows defined in '{}'", .0.display())]
    NoWorkflows(PathBuf),

    #[error("Invalid choice '{0}'. Please enter a number from the list.")]
    InvalidSelection(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),
}
