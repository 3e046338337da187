//! Configuration Validation
//!
//! Lints a loaded configuration for mistakes that would otherwise surface
//! only mid-run, or never. Nothing here is fatal: the issues are reported
//! as warnings and the configuration is used unchanged.

use log::{debug, info, warn};

use super::model::{StepAction, WorkflowConfig};
use super::resolver::{has_unterminated_placeholder, placeholders};

/// A suspicious construct found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyWorkflow(String),
    EmptyRun { workflow: String, step: usize },
    UnknownHook { workflow: String, step: usize, hook: String },
    EmptyHookGroup(String),
    MissingMacroTarget { workflow: String, step: usize },
    UnterminatedPlaceholder { workflow: String, step: usize },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWorkflow(name) => write!(f, "Workflow '{}' has no steps", name),
            Self::EmptyRun { workflow, step } => {
                write!(f, "Workflow '{}' step {} has no `run` command", workflow, step)
            }
            Self::UnknownHook {
                workflow,
                step,
                hook,
            } => write!(
                f,
                "Workflow '{}' step {} references undefined hook group '{}'; it will run nothing",
                workflow, step, hook
            ),
            Self::EmptyHookGroup(name) => write!(f, "Hook group '{}' has no commands", name),
            Self::MissingMacroTarget { workflow, step } => {
                write!(f, "Workflow '{}' step {} has a macro without a target", workflow, step)
            }
            Self::UnterminatedPlaceholder { workflow, step } => write!(
                f,
                "Workflow '{}' step {} opens a '{{{{' placeholder that is never closed",
                workflow, step
            ),
        }
    }
}

/// Checks every workflow and hook group and returns what looks wrong.
///
/// Hook references are only checked when the `run` text is literal; a
/// marker built from placeholders is classified after resolution.
pub fn validate_config(config: &WorkflowConfig) -> Vec<ValidationIssue> {
    info!(
        "Validating {} workflows, {} hook groups",
        config.workflows.len(),
        config.hooks.len()
    );

    let mut issues = Vec::new();

    for workflow in &config.workflows {
        if workflow.is_empty() {
            issues.push(ValidationIssue::EmptyWorkflow(workflow.name.clone()));
            continue;
        }

        for (i, step) in workflow.steps.iter().enumerate() {
            let step_no = i + 1;
            let run = step.run.trim();

            if run.is_empty() {
                issues.push(ValidationIssue::EmptyRun {
                    workflow: workflow.name.clone(),
                    step: step_no,
                });
                continue;
            }

            if has_unterminated_placeholder(run) {
                issues.push(ValidationIssue::UnterminatedPlaceholder {
                    workflow: workflow.name.clone(),
                    step: step_no,
                });
            }

            if !placeholders(run).is_empty() {
                debug!("Workflow '{}' step {} is templated", workflow.name, step_no);
                continue;
            }

            match StepAction::classify(run) {
                StepAction::HookGroup(name) | StepAction::GuardedMerge(name) if name.is_empty() => {
                    issues.push(ValidationIssue::MissingMacroTarget {
                        workflow: workflow.name.clone(),
                        step: step_no,
                    });
                }
                StepAction::HookGroup(name) if config.hook(&name).is_none() => {
                    issues.push(ValidationIssue::UnknownHook {
                        workflow: workflow.name.clone(),
                        step: step_no,
                        hook: name,
                    });
                }
                _ => {}
            }
        }
    }

    let mut hook_names: Vec<&String> = config.hooks.keys().collect();
    hook_names.sort();
    for name in hook_names {
        if config.hooks[name].is_empty() {
            issues.push(ValidationIssue::EmptyHookGroup(name.clone()));
        }
    }

    issues
}

/// Logs every issue as a warning and returns how many there were.
pub fn report_issues(issues: &[ValidationIssue]) -> usize {
    for issue in issues {
        warn!("{}", issue);
    }
    issues.len()
}
