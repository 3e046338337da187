//! Workflow Execution Engine
//!
//! Runs a confirmed plan step by step:
//! - Plain commands go straight to the [`CommandRunner`]
//! - Hook groups expand into their configured commands
//! - Guarded merges expand into checkout / pull / merge / checkout back
//!
//! The first failing step aborts the run. Steps that already ran are not
//! rolled back.

use log::{error, info};

use crate::console;
use crate::workflow::{PlannedStep, StepAction, WorkflowConfig};

use super::runner::{CommandFailure, CommandRunner};

/// Remote used by the guarded merge's pull.
pub const DEFAULT_REMOTE: &str = "origin";

/// Final state of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step succeeded
    Completed { steps: usize },
    /// Step `step` (1-based) of `total` failed; later steps never ran
    Aborted {
        step: usize,
        total: usize,
        description: String,
        reason: String,
    },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// The commands a guarded merge of `current` into `target` runs, in order.
///
/// ```
/// use gitease::execution::engine::merge_sequence;
///
/// let steps = merge_sequence("production", "feature-x");
/// assert_eq!(steps[1], "git pull origin production");
/// assert_eq!(steps[3], "git checkout feature-x");
/// ```
pub fn merge_sequence(target: &str, current: &str) -> [String; 4] {
    [
        format!("git checkout {}", target),
        format!("git pull {} {}", DEFAULT_REMOTE, target),
        format!("git merge {}", current),
        format!("git checkout {}", current),
    ]
}

/// Workflow execution engine.
///
/// # Example
///
/// ```rust,no_run
/// use gitease::console::TerminalPrompt;
/// use gitease::execution::{Engine, ExecutionContext, ShellRunner};
/// use gitease::workflow::{load_config, plan, Resolver};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_config(".gitease/workflow.yml")?;
///
///     let mut prompt = TerminalPrompt;
///     let steps = plan("release", &config, &mut Resolver::new(&mut prompt))?;
///
///     let mut runner = ShellRunner::new(ExecutionContext::new());
///     let outcome = Engine::new(&mut runner).run(&steps, &config, "feature-x");
///     println!("{:?}", outcome);
///     Ok(())
/// }
/// ```
pub struct Engine<'r> {
    runner: &'r mut dyn CommandRunner,
}

impl<'r> Engine<'r> {
    pub fn new(runner: &'r mut dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Executes `plan` in order, stopping at the first failing step.
    ///
    /// `current_branch` is the branch guarded merges start from and
    /// return to.
    pub fn run(
        &mut self,
        plan: &[PlannedStep],
        config: &WorkflowConfig,
        current_branch: &str,
    ) -> RunOutcome {
        let total = plan.len();
        info!("Executing {} steps from branch '{}'", total, current_branch);

        for (i, step) in plan.iter().enumerate() {
            let index = i + 1;
            console::print_step(index, total, &step.description);

            if let Err(failure) = self.execute_step(step, config, current_branch) {
                error!("Step {}/{} failed: {}", index, total, failure);
                console::print_error("Step failed. Aborting workflow.");
                console::print_header(&format!("Workflow aborted at step {}/{}.", index, total));

                return RunOutcome::Aborted {
                    step: index,
                    total,
                    description: step.description.clone(),
                    reason: failure.to_string(),
                };
            }

            console::print_success("Step completed successfully.");
        }

        console::print_header("Workflow finished.");
        RunOutcome::Completed { steps: total }
    }

    fn execute_step(
        &mut self,
        step: &PlannedStep,
        config: &WorkflowConfig,
        current_branch: &str,
    ) -> Result<(), CommandFailure> {
        match &step.action {
            StepAction::Command(command) => self.runner.run(command),
            StepAction::HookGroup(name) => self.run_hook_group(name, config),
            StepAction::GuardedMerge(target) => self.run_guarded_merge(target, current_branch),
        }
    }

    fn run_hook_group(&mut self, name: &str, config: &WorkflowConfig) -> Result<(), CommandFailure> {
        let Some(commands) = config.hook(name) else {
            // Undefined groups run nothing and count as success
            console::print_warning(&format!(
                "Hook group '{}' is not defined; nothing to run",
                name
            ));
            return Ok(());
        };

        info!("Running hook group '{}' ({} commands)", name, commands.len());
        for command in commands {
            self.runner.run(command)?;
        }
        Ok(())
    }

    fn run_guarded_merge(&mut self, target: &str, current_branch: &str) -> Result<(), CommandFailure> {
        console::print_info(&format!(
            "Performing safe merge from '{}' to '{}'...",
            current_branch, target
        ));

        // A failure leaves the working tree wherever it stopped
        for command in merge_sequence(target, current_branch) {
            self.runner.run(&command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    fn create_test_config() -> WorkflowConfig {
        WorkflowConfig::from_yaml_str(
            r#"
hooks:
  checks:
    - cargo fmt --check
    - cargo clippy
    - cargo test
"#,
        )
        .unwrap()
    }

    fn plan_of(commands: &[&str]) -> Vec<PlannedStep> {
        commands
            .iter()
            .enumerate()
            .map(|(i, c)| PlannedStep::new(format!("step {}", i + 1), *c))
            .collect()
    }

    #[test]
    fn test_run_plain_commands_in_order() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["git fetch", "git status"]),
            &config,
            "main",
        );

        assert_eq!(outcome, RunOutcome::Completed { steps: 2 });
        assert!(outcome.is_completed());
        assert_eq!(runner.commands(), ["git fetch", "git status"]);
    }

    #[test]
    fn test_fail_fast_stops_at_failing_step() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new().fail_on("step-two");

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["step-one", "step-two", "step-three", "step-four"]),
            &config,
            "main",
        );

        match outcome {
            RunOutcome::Aborted {
                step,
                total,
                description,
                reason,
            } => {
                assert_eq!(step, 2);
                assert_eq!(total, 4);
                assert_eq!(description, "step 2");
                assert!(reason.contains("step-two"));
            }
            other => panic!("Expected Aborted, got {:?}", other),
        }
        assert_eq!(runner.commands(), ["step-one", "step-two"]);
    }

    #[test]
    fn test_fail_fast_reports_exact_index() {
        let config = create_test_config();
        let commands = ["a", "b", "c", "d", "e"];

        for k in 1..=commands.len() {
            let mut runner = RecordingRunner::new().fail_on(commands[k - 1]);
            let outcome = Engine::new(&mut runner).run(&plan_of(&commands), &config, "main");

            assert!(matches!(outcome, RunOutcome::Aborted { step, .. } if step == k));
            assert_eq!(runner.commands().len(), k);
        }
    }

    #[test]
    fn test_hook_group_runs_all_commands() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(&plan_of(&["hooks:checks"]), &config, "main");

        assert!(outcome.is_completed());
        assert_eq!(
            runner.commands(),
            ["cargo fmt --check", "cargo clippy", "cargo test"]
        );
    }

    #[test]
    fn test_hook_group_stops_at_first_failure() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new().fail_on("cargo clippy");

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["hooks:checks", "git push"]),
            &config,
            "main",
        );

        assert!(matches!(outcome, RunOutcome::Aborted { step: 1, .. }));
        assert_eq!(runner.commands(), ["cargo fmt --check", "cargo clippy"]);
    }

    #[test]
    fn test_missing_hook_group_is_vacuous_success() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["hooks:lint", "git status"]),
            &config,
            "main",
        );

        assert_eq!(outcome, RunOutcome::Completed { steps: 2 });
        assert_eq!(runner.commands(), ["git status"]);
    }

    #[test]
    fn test_empty_hook_name_runs_nothing() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["hooks:", "git status"]),
            &config,
            "main",
        );

        assert_eq!(outcome, RunOutcome::Completed { steps: 2 });
        assert_eq!(runner.commands(), ["git status"]);
    }

    #[test]
    fn test_empty_merge_target_is_left_to_git() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new().fail_on("git checkout ");

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["git merge_to_branch:"]),
            &config,
            "feature-x",
        );

        assert!(matches!(outcome, RunOutcome::Aborted { step: 1, .. }));
        assert_eq!(runner.commands(), ["git checkout "]);
    }

    #[test]
    fn test_guarded_merge_sequence() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["git merge_to_branch:production"]),
            &config,
            "feature-x",
        );

        assert!(outcome.is_completed());
        assert_eq!(
            runner.commands(),
            [
                "git checkout production",
                "git pull origin production",
                "git merge feature-x",
                "git checkout feature-x",
            ]
        );
    }

    #[test]
    fn test_guarded_merge_failure_does_not_switch_back() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new().fail_on("git merge feature-x");

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["git merge_to_branch:production", "git push"]),
            &config,
            "feature-x",
        );

        assert!(matches!(outcome, RunOutcome::Aborted { step: 1, total: 2, .. }));
        assert_eq!(
            runner.commands(),
            [
                "git checkout production",
                "git pull origin production",
                "git merge feature-x",
            ]
        );
    }

    #[test]
    fn test_guarded_merge_checkout_failure() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new().fail_on("git checkout production");

        let outcome = Engine::new(&mut runner).run(
            &plan_of(&["git merge_to_branch:production"]),
            &config,
            "feature-x",
        );

        assert!(!outcome.is_completed());
        assert_eq!(runner.commands(), ["git checkout production"]);
    }

    #[test]
    fn test_empty_plan_completes() {
        let config = create_test_config();
        let mut runner = RecordingRunner::new();

        let outcome = Engine::new(&mut runner).run(&[], &config, "main");

        assert_eq!(outcome, RunOutcome::Completed { steps: 0 });
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_merge_sequence_uses_default_remote() {
        let steps = merge_sequence("release", "dev");
        assert_eq!(steps[0], "git checkout release");
        assert_eq!(steps[1], format!("git pull {} release", DEFAULT_REMOTE));
        assert_eq!(steps[2], "git merge dev");
        assert_eq!(steps[3], "git checkout dev");
    }
}
