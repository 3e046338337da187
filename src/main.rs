//! GitEase CLI Entry Point
//!
//! # Usage
//!
//! ```bash
//! # Pick a workflow from the menu
//! gitease
//!
//! # Run a workflow by name, skipping the menu
//! gitease --workflow release
//!
//! # Show the plan only
//! gitease --workflow release --dry-run
//!
//! # Use another configuration file
//! gitease --config ci/workflow.yml
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use log::{debug, info};

use gitease::console::{self, TerminalPrompt};
use gitease::execution::{ExecutionContext, RunOutcome, ShellRunner};
use gitease::session::{Session, SessionOptions, SessionOutcome};
use gitease::workflow::{default_config_path, ConfigError};
use gitease::{SessionError, APP_NAME, VERSION};

/// Command-line options parsed from arguments.
#[derive(Debug, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    workflow: Option<String>,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    dry_run: bool,
    assume_yes: bool,
    list: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: gitease [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config PATH       Workflow file (default: .gitease/workflow.yml)");
    println!("  --workflow NAME     Run the named workflow without showing the menu");
    println!("  --working-dir PATH  Directory in which all commands run");
    println!("  --env KEY=VALUE     Extra environment variable for every command");
    println!("  --dry-run           Show the plan without executing it");
    println!("  --yes, -y           Execute without asking for confirmation");
    println!("  --list              List the configured workflows and exit");
    println!("  --verbose, -v       Enable debug logging");
    println!("  --help, -h          Show this help message");
    println!("  --version, -V       Show version information");
    println!();
    println!("Examples:");
    println!("  gitease");
    println!("  gitease --workflow release --dry-run");
    println!("  gitease --workflow sync --yes");
}

/// Returns the value following an option, advancing the cursor.
fn option_value<'a>(args: &'a [String], i: &mut usize, option: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires an argument", option))
}

/// Parses command-line arguments into a CliOptions struct.
fn parse_arguments(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--dry-run" => options.dry_run = true,
            "--yes" | "-y" => options.assume_yes = true,
            "--list" => options.list = true,
            "--verbose" | "-v" => options.verbose = true,
            "--config" => {
                options.config_path = Some(PathBuf::from(option_value(args, &mut i, arg)?));
            }
            "--workflow" => {
                options.workflow = Some(option_value(args, &mut i, arg)?.to_string());
            }
            "--working-dir" => {
                options.working_dir = Some(PathBuf::from(option_value(args, &mut i, arg)?));
            }
            "--env" => {
                let pair = option_value(args, &mut i, arg)?;
                let (key, value) = pair
                    .split_once('=')
                    .filter(|(key, _)| !key.is_empty())
                    .ok_or_else(|| format!("Invalid --env value '{}', expected KEY=VALUE", pair))?;
                options.env.push((key.to_string(), value.to_string()));
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(options)
}

/// Validates the working directory without changing the process's own.
fn resolve_working_directory(
    working_dir: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let Some(dir) = working_dir else {
        return Ok(env::current_dir()?);
    };

    if !dir.exists() {
        return Err(format!("Working directory does not exist: {}", dir.display()).into());
    }

    if !dir.is_dir() {
        return Err(format!("Path is not a directory: {}", dir.display()).into());
    }

    Ok(dir)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let options = parse_arguments(&args).map_err(|e| {
        print_usage();
        eprintln!();
        e
    })?;

    setup_logging(options.verbose);
    debug!("{:?}", options);

    let root = resolve_working_directory(options.working_dir)?;
    info!("Working directory: {}", root.display());

    let config_path = options
        .config_path
        .map(|path| if path.is_relative() { root.join(path) } else { path })
        .unwrap_or_else(|| default_config_path(&root));

    let mut context = ExecutionContext::new().with_working_dir(&root);
    context.env = options.env;

    let mut runner = ShellRunner::new(context);
    let mut prompt = TerminalPrompt;

    let mut session_options = SessionOptions::new(config_path);
    session_options.workflow = options.workflow;
    session_options.dry_run = options.dry_run;
    session_options.assume_yes = options.assume_yes;

    let mut session = Session::new(session_options, &mut runner, &mut prompt);

    if options.list {
        session.list().map_err(explain)?;
        return Ok(());
    }

    match session.start().map_err(explain)? {
        SessionOutcome::Ran(RunOutcome::Aborted { step, total, .. }) => {
            info!("Workflow stopped after step {}/{}", step, total);
        }
        SessionOutcome::Ran(RunOutcome::Completed { steps }) => {
            info!("Workflow completed ({} steps)", steps);
        }
        SessionOutcome::Cancelled | SessionOutcome::Previewed => {}
    }

    Ok(())
}

/// Adds a hint for the errors a first-time user is likely to hit.
fn explain(err: SessionError) -> SessionError {
    match &err {
        SessionError::ConfigLoad(ConfigError::NotFound { .. }) => console::print_info(
            "Please create a '.gitease/workflow.yml' file in your project root.",
        ),
        SessionError::GitUnavailable => console::print_info(
            "Please install Git to use this tool: https://git-scm.com/downloads",
        ),
        _ => {}
    }
    err
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{:?}", e);
            console::print_error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
