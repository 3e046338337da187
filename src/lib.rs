//! GitEase - Git Workflow Agent
//!
//! Runs named, multi-step git workflows declared in
//! `.gitease/workflow.yml`. Every workflow is fully resolved and shown as
//! a plan before anything runs, and execution stops at the first failing
//! step.
//!
//! # Architecture
//!
//! - [`workflow`]: Configuration model, loading, placeholder resolution and planning
//! - [`execution`]: Command runner and the fail-fast execution engine
//! - [`session`]: Interactive controller tying the pieces together
//! - [`console`]: Terminal output and prompts
//!
//! # Example
//!
//! ```rust,no_run
//! use gitease::console::TerminalPrompt;
//! use gitease::execution::{ExecutionContext, ShellRunner};
//! use gitease::session::{Session, SessionOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut runner = ShellRunner::new(ExecutionContext::new());
//!     let mut prompt = TerminalPrompt;
//!
//!     let options = SessionOptions::new(".gitease/workflow.yml");
//!     let outcome = Session::new(options, &mut runner, &mut prompt).start()?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod console;
pub mod error;
pub mod execution;
pub mod session;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use error::SessionError;
pub use execution::engine::Engine;
pub use workflow::model::{PlannedStep, WorkflowConfig};
pub use workflow::parser::load_config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "GitEase";
