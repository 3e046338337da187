//! External Command Runner
//!
//! Executes a single shell command in an explicit [`ExecutionContext`],
//! streaming stdout to the console and collecting stderr for failure
//! reports.

use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use log::{debug, warn};
use thiserror::Error;

use crate::console;

/// Why an external command did not succeed.
#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("'{command}' {}", describe_exit(.code))]
    Exit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl CommandFailure {
    /// The command that failed.
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. } | Self::Exit { command, .. } => command,
        }
    }

    /// Captured stderr text; empty when the process never started.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Exit { stderr, .. } => stderr,
        }
    }
}

/// Runs external commands on behalf of the engine.
pub trait CommandRunner {
    /// Runs `command`, echoing it and streaming its output.
    fn run(&mut self, command: &str) -> Result<(), CommandFailure>;

    /// Runs `command`, echoing it without streaming output, and returns
    /// its trimmed stdout.
    fn capture(&mut self, command: &str) -> Result<String, CommandFailure>;
}

/// Process state every external command inherits.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Directory commands run in; `None` keeps the process's own
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Whether stdout is echoed while a command runs
    pub stream_output: bool,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: Vec::new(),
            stream_output: true,
        }
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }
}

/// [`CommandRunner`] that hands commands to the platform shell.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    context: ExecutionContext,
}

impl ShellRunner {
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    fn shell_command(&self, command: &str) -> Command {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        };

        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        };

        if let Some(dir) = &self.context.working_dir {
            cmd.current_dir(dir);
            debug!("Executing in directory: {}", dir.display());
        }
        cmd.envs(self.context.env.iter().map(|(k, v)| (k, v)));
        cmd
    }

    fn check_status(
        command: &str,
        status: ExitStatus,
        stderr: String,
    ) -> Result<(), CommandFailure> {
        if status.success() {
            if !stderr.trim().is_empty() {
                debug!("stderr of '{}':\n{}", command, stderr.trim_end());
            }
            return Ok(());
        }

        Err(CommandFailure::Exit {
            command: command.to_string(),
            code: status.code(),
            stderr,
        })
    }
}

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> Result<(), CommandFailure> {
        console::print_command(command);

        let spawn_failure = |source| CommandFailure::Spawn {
            command: command.to_string(),
            source,
        };

        let mut child = self
            .shell_command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failure)?;

        // stderr is drained on its own thread so a chatty command cannot
        // block on a full pipe while stdout is being streamed
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(e) = stderr.read_to_end(&mut buf) {
                    debug!("Reading stderr failed: {}", e);
                }
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        // Output is read as bytes until EOF; closing the pipe early would
        // kill the command with SIGPIPE
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) if self.context.stream_output => {
                        print!("{}", String::from_utf8_lossy(&line));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Stopped reading output of '{}': {}", command, e);
                        break;
                    }
                }
            }
        }

        let status = child.wait().map_err(spawn_failure)?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        let result = Self::check_status(command, status, stderr);
        if let Err(failure) = &result {
            for line in failure.stderr().trim().lines() {
                console::print_error(&format!("  {}", line.trim()));
            }
        }
        result
    }

    fn capture(&mut self, command: &str) -> Result<String, CommandFailure> {
        console::print_command(command);

        let output = self
            .shell_command(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandFailure::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        Self::check_status(command, output.status, stderr)?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
