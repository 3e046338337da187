//! Session Controller
//!
//! Drives one invocation end to end: load the configuration, find the
//! current branch, pick a workflow, plan it, show the plan, ask for
//! confirmation and hand the plan to the [`Engine`].

use std::path::PathBuf;

use colored::Colorize;
use log::{debug, info, warn};

use crate::console::{self, Prompt};
use crate::error::SessionError;
use crate::execution::{CommandRunner, Engine, RunOutcome};
use crate::workflow::{
    load_config, plan, report_issues, validate_config, PlannedStep, Resolver, WorkflowConfig,
};

const GIT_VERSION_PROBE: &str = "git --version";
const CURRENT_BRANCH_PROBE: &str = "git rev-parse --abbrev-ref HEAD";

const SELECTION_QUESTION: &str = "\nEnter the number of the workflow to run: ";
const CONFIRM_QUESTION: &str = "\nDo you want to proceed with execution? (y/n): ";

/// What the user asked this session to do.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub config_path: PathBuf,
    /// Run this workflow instead of showing the menu
    pub workflow: Option<String>,
    /// Stop after showing the plan
    pub dry_run: bool,
    /// Skip the confirmation gate
    pub assume_yes: bool,
}

impl SessionOptions {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            workflow: None,
            dry_run: false,
            assume_yes: false,
        }
    }
}

/// How a session ended when nothing went wrong before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The plan was executed (possibly aborting part-way)
    Ran(RunOutcome),
    /// The user declined the plan
    Cancelled,
    /// Dry run: the plan was shown and nothing executed
    Previewed,
}

pub struct Session<'a> {
    options: SessionOptions,
    runner: &'a mut dyn CommandRunner,
    prompt: &'a mut dyn Prompt,
}

impl<'a> Session<'a> {
    pub fn new(
        options: SessionOptions,
        runner: &'a mut dyn CommandRunner,
        prompt: &'a mut dyn Prompt,
    ) -> Self {
        Self {
            options,
            runner,
            prompt,
        }
    }

    /// Loads the configuration and logs any validation warnings.
    pub fn load_config(&self) -> Result<WorkflowConfig, SessionError> {
        let config = load_config(&self.options.config_path)?;
        let warnings = report_issues(&validate_config(&config));
        if warnings > 0 {
            info!("Configuration loaded with {} warning(s)", warnings);
        }
        Ok(config)
    }

    /// Prints the configured workflow names and returns them.
    pub fn list(&self) -> Result<Vec<String>, SessionError> {
        let config = self.load_config()?;
        let names: Vec<String> = config.workflow_names().into_iter().map(String::from).collect();

        println!("Available Workflows:");
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        Ok(names)
    }

    /// Runs the whole session.
    pub fn start(&mut self) -> Result<SessionOutcome, SessionError> {
        let config = self.load_config()?;
        let current_branch = self.current_branch()?;

        console::print_header(&format!("GitEase Agent for '{}'", config.display_name()));
        println!("Current Branch: {}", current_branch.blue());

        if config.workflows.is_empty() {
            return Err(SessionError::NoWorkflows(self.options.config_path.clone()));
        }

        let workflow_name = match self.options.workflow.clone() {
            Some(name) => name,
            None => self.select_workflow(&config)?,
        };

        self.run_workflow(&workflow_name, &config, &current_branch)
    }

    /// Plans, previews, confirms and executes one workflow.
    pub fn run_workflow(
        &mut self,
        workflow_name: &str,
        config: &WorkflowConfig,
        current_branch: &str,
    ) -> Result<SessionOutcome, SessionError> {
        let steps = {
            let mut resolver = Resolver::new(&mut *self.prompt);
            plan(workflow_name, config, &mut resolver)?
        };

        console::print_header(&format!("Workflow Plan: '{}'", workflow_name));
        print_plan(&steps);

        if self.options.dry_run {
            console::print_info("Dry run: no commands were executed.");
            return Ok(SessionOutcome::Previewed);
        }

        if !self.options.assume_yes && !console::confirm(&mut *self.prompt, CONFIRM_QUESTION)? {
            console::print_info("Execution cancelled by user.");
            return Ok(SessionOutcome::Cancelled);
        }

        console::print_header(&format!("Executing Workflow: '{}'", workflow_name));
        let outcome = Engine::new(&mut *self.runner).run(&steps, config, current_branch);
        Ok(SessionOutcome::Ran(outcome))
    }

    /// Determines the checked-out branch, failing if git cannot tell.
    fn current_branch(&mut self) -> Result<String, SessionError> {
        if let Err(e) = self.runner.capture(GIT_VERSION_PROBE) {
            debug!("{}", e);
            return Err(SessionError::GitUnavailable);
        }

        let branch = self.runner.capture(CURRENT_BRANCH_PROBE).map_err(|e| {
            debug!("{}", e);
            SessionError::BranchResolution
        })?;

        if branch.is_empty() {
            return Err(SessionError::BranchResolution);
        }
        if branch == "HEAD" {
            warn!("HEAD is detached; guarded merges will switch back to a detached HEAD");
        }

        Ok(branch)
    }

    fn select_workflow(&mut self, config: &WorkflowConfig) -> Result<String, SessionError> {
        let names = config.workflow_names();

        println!();
        println!("Available Workflows:");
        for (i, name) in names.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }

        let answer = self.prompt.ask(SELECTION_QUESTION)?;
        parse_selection(&answer, names.len())
            .map(|index| names[index].to_string())
            .ok_or_else(|| SessionError::InvalidSelection(answer.trim().to_string()))
    }
}

/// Converts a 1-based menu answer into an index below `count`.
///
/// ```
/// use gitease::session::parse_selection;
///
/// assert_eq!(parse_selection(" 2 ", 3), Some(1));
/// assert_eq!(parse_selection("0", 3), None);
/// assert_eq!(parse_selection("4", 3), None);
/// assert_eq!(parse_selection("two", 3), None);
/// ```
pub fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Some(choice - 1),
        _ => None,
    }
}

fn print_plan(steps: &[PlannedStep]) {
    console::print_info("The agent will perform the following steps:");
    for (i, step) in steps.iter().enumerate() {
        console::print_plan_entry(i + 1, &step.description, &step.resolved_command);
    }
}
