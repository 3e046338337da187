//! Test doubles for the terminal and the shell.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;

use crate::console::Prompt;
use crate::execution::runner::{CommandFailure, CommandRunner};

/// Prompt that replays canned answers and records every question.
///
/// Once the answers run out it behaves like a closed stdin.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

/// Runner that records commands instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Vec<String>,
    failing: HashSet<String>,
    outputs: HashMap<String, String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `command` exit non-zero.
    pub fn fail_on(mut self, command: impl Into<String>) -> Self {
        self.failing.insert(command.into());
        self
    }

    /// Sets the captured stdout returned for `command`.
    pub fn with_output(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.insert(command.into(), output.into());
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn record(&mut self, command: &str) -> Result<(), CommandFailure> {
        self.commands.push(command.to_string());
        if self.failing.contains(command) {
            return Err(CommandFailure::Exit {
                command: command.to_string(),
                code: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&mut self, command: &str) -> Result<(), CommandFailure> {
        self.record(command)
    }

    fn capture(&mut self, command: &str) -> Result<String, CommandFailure> {
        self.record(command)?;
        Ok(self.outputs.get(command).cloned().unwrap_or_default())
    }
}
