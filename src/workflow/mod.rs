//! Workflow Definition Module
//!
//! Provides data structures and utilities for loading workflow
//! configurations and turning them into executable plans.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (WorkflowConfig, StepDef, PlannedStep)
//! - [`parser`]: YAML loading
//! - [`validator`]: Non-fatal configuration checks
//! - [`resolver`]: `{{placeholder}}` substitution
//! - [`planner`]: Dry-run plan construction

pub mod model;
pub mod parser;
pub mod planner;
pub mod resolver;
pub mod validator;

pub use model::{PlannedStep, StepAction, StepDef, Workflow, WorkflowConfig};
pub use parser::{default_config_path, load_config, ConfigError};
pub use planner::{plan, PlanError};
pub use resolver::{resolve_pure, ResolveError, Resolver};
pub use validator::{report_issues, validate_config, ValidationIssue};
