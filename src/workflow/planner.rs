//! Workflow Planner
//!
//! Turns a named workflow into an ordered, fully resolved plan without
//! executing anything. Either every step resolves or no plan is produced.

use log::{debug, info, warn};
use thiserror::Error;

use super::model::{PlannedStep, StepAction, WorkflowConfig};
use super::resolver::{ResolveError, Resolver};

/// Errors that prevent a plan from being built.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Workflow '{0}' not found in your config file")]
    WorkflowNotFound(String),

    #[error("Step {step} ({description}): {source}")]
    Resolution {
        step: usize,
        description: String,
        #[source]
        source: ResolveError,
    },
}

/// Resolves every step of `workflow_name` in declared order.
///
/// Step numbers in errors are 1-based.
///
/// # Example
///
/// ```
/// use gitease::console::Prompt;
/// use gitease::workflow::{plan, Resolver, StepAction, WorkflowConfig};
///
/// struct NoInput;
/// impl Prompt for NoInput {
///     fn ask(&mut self, _question: &str) -> std::io::Result<String> {
///         Ok(String::new())
///     }
/// }
///
/// let config = WorkflowConfig::from_yaml_str(r#"
/// branches: { prod: production }
/// workflows:
///   sync:
///     - description: merge to prod
///       run: "git merge_to_branch:{{branches.prod}}"
/// "#).unwrap();
///
/// let mut prompt = NoInput;
/// let mut resolver = Resolver::new(&mut prompt);
/// let steps = plan("sync", &config, &mut resolver).unwrap();
/// assert_eq!(steps[0].action, StepAction::GuardedMerge("production".to_string()));
/// ```
pub fn plan(
    workflow_name: &str,
    config: &WorkflowConfig,
    resolver: &mut Resolver<'_>,
) -> Result<Vec<PlannedStep>, PlanError> {
    let workflow = config
        .workflow(workflow_name)
        .ok_or_else(|| PlanError::WorkflowNotFound(workflow_name.to_string()))?;

    info!(
        "Planning workflow '{}' ({} steps)",
        workflow.name,
        workflow.len()
    );

    let mut planned = Vec::with_capacity(workflow.len());

    for (i, step) in workflow.steps.iter().enumerate() {
        let resolved = resolver
            .resolve(&step.run, config)
            .map_err(|source| PlanError::Resolution {
                step: i + 1,
                description: step.description.clone(),
                source,
            })?;

        let planned_step = PlannedStep::new(step.description.clone(), resolved);

        if let StepAction::HookGroup(target) | StepAction::GuardedMerge(target) =
            &planned_step.action
        {
            if target.is_empty() {
                warn!(
                    "Step {} ('{}') names no target: '{}'",
                    i + 1,
                    step.description,
                    planned_step.resolved_command
                );
            }
        }

        debug!(
            "Step {}: '{}' -> {:?}",
            i + 1,
            planned_step.resolved_command,
            planned_step.action
        );
        planned.push(planned_step);
    }

    Ok(planned)
}
