//! Console Protocol
//!
//! User-facing output (headers, step progress, echoed commands) and the
//! line-based prompt used for selections, confirmations and dynamic
//! variables.

use std::io::{self, BufRead, Write};

use colored::Colorize;

/// Reads one answer from the user.
///
/// Implementations return an empty string when no input is available.
pub trait Prompt {
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompt backed by the process's stdin/stdout.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            // EOF
            println!();
            return Ok(String::new());
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Asks a yes/no question; only `y` (any case) counts as yes.
pub fn confirm(prompt: &mut dyn Prompt, question: &str) -> io::Result<bool> {
    let answer = prompt.ask(question)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

pub fn print_header(message: &str) {
    println!();
    println!("{}", format!("--- {} ---", message).magenta().bold());
}

pub fn print_success(message: &str) {
    println!("{}", format!("✓ {}", message).green());
}

pub fn print_error(message: &str) {
    println!("{}", format!("✗ {}", message).red());
}

pub fn print_info(message: &str) {
    println!("{}", format!("i {}", message).cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("! {}", message).yellow());
}

/// Echoes a command before it runs.
pub fn print_command(command: &str) {
    println!("{}", format!("$ {}", command).yellow());
}

/// Prints one entry of the plan preview.
pub fn print_plan_entry(index: usize, description: &str, command: &str) {
    println!("  {}. {}", index, description);
    println!("     {}", format!("↳ {}", command).yellow());
}

/// Prints the `--- Step i/N: description ---` progress line.
pub fn print_step(index: usize, total: usize, description: &str) {
    println!();
    println!("--- Step {}/{}: {} ---", index, total, description);
}
