//! Placeholder Resolution
//!
//! Expands `{{dotted.path}}` placeholders in a command template against the
//! configuration tree.
//!
//! Resolution is split in two layers:
//! - [`resolve_pure`] never touches the terminal. A missing `version`
//!   yields [`ResolveError::NeedsInput`] instead of prompting.
//! - [`Resolver`] wraps a [`Prompt`] and answers those requests
//!   interactively, caching each answer for the rest of the planning pass.

use std::collections::HashMap;
use std::io;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::model::{scalar_text, WorkflowConfig};
use crate::console::Prompt;

/// Placeholder name that falls back to an interactive prompt.
pub const VERSION_VARIABLE: &str = "version";

/// Non-greedy `{{...}}` matcher.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid"));

/// Errors raised while resolving a template.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Variable '{0}' not found in config")]
    MissingVariable(String),

    #[error("Variable '{0}' requires a value from the user")]
    NeedsInput(String),

    #[error("Value for '{0}' cannot be empty")]
    EmptyInput(String),

    #[error("Variable '{0}' does not resolve to a single value")]
    NotScalar(String),

    #[error("Failed to read input: {0}")]
    Prompt(#[from] io::Error),
}

/// Returns the raw text of every placeholder in `template`, left to right.
///
/// ```
/// use gitease::workflow::resolver::placeholders;
///
/// let found = placeholders("git tag v{{version}} -m '{{ project_name }}'");
/// assert_eq!(found, vec!["version", " project_name "]);
/// ```
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Returns true if `template` opens a `{{` that is never closed.
pub fn has_unterminated_placeholder(template: &str) -> bool {
    PLACEHOLDER.replace_all(template, "").contains("{{")
}

/// Substitutes every placeholder in `template` without prompting.
///
/// `answers` supplies values for placeholders that are absent from the tree
/// but were collected from the user earlier. On any failure no text is
/// returned.
pub fn resolve_pure(
    template: &str,
    config: &WorkflowConfig,
    answers: &HashMap<String, String>,
) -> Result<String, ResolveError> {
    let mut resolved = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let value = lookup_placeholder(inner.as_str(), config, answers)?;
        resolved.push_str(&template[last..whole.start()]);
        resolved.push_str(&value);
        last = whole.end();
    }

    resolved.push_str(&template[last..]);
    Ok(resolved)
}

fn lookup_placeholder(
    raw: &str,
    config: &WorkflowConfig,
    answers: &HashMap<String, String>,
) -> Result<String, ResolveError> {
    let name = raw.trim();
    let path: Vec<&str> = name.split('.').collect();

    match config.lookup(&path) {
        Some(value) => scalar_text(value).ok_or_else(|| ResolveError::NotScalar(name.to_string())),
        None if raw == VERSION_VARIABLE => answers
            .get(raw)
            .cloned()
            .ok_or_else(|| ResolveError::NeedsInput(raw.to_string())),
        None => Err(ResolveError::MissingVariable(name.to_string())),
    }
}

/// Interactive resolver used during one planning pass.
pub struct Resolver<'p> {
    prompt: &'p mut dyn Prompt,
    answers: HashMap<String, String>,
}

impl<'p> Resolver<'p> {
    pub fn new(prompt: &'p mut dyn Prompt) -> Self {
        Self {
            prompt,
            answers: HashMap::new(),
        }
    }

    /// Resolves `template`, prompting for reserved variables when needed.
    pub fn resolve(
        &mut self,
        template: &str,
        config: &WorkflowConfig,
    ) -> Result<String, ResolveError> {
        loop {
            match resolve_pure(template, config, &self.answers) {
                Err(ResolveError::NeedsInput(variable)) => {
                    let answer = self.prompt.ask(&question_for(&variable))?;
                    let answer = answer.trim();
                    if answer.is_empty() {
                        return Err(ResolveError::EmptyInput(variable));
                    }
                    debug!("Using '{}' for {{{{{}}}}}", answer, variable);
                    self.answers.insert(variable, answer.to_string());
                }
                other => return other,
            }
        }
    }

    /// Values collected from the user so far.
    pub fn answers(&self) -> &HashMap<String, String> {
        &self.answers
    }
}

fn question_for(variable: &str) -> String {
    if variable == VERSION_VARIABLE {
        "Please enter the version for the tag (e.g., 1.2.3): ".to_string()
    } else {
        format!("Please enter a value for '{}': ", variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPrompt;

    fn config() -> WorkflowConfig {
        WorkflowConfig::from_yaml_str(
            r#"
project_name: demo
branches:
  development: develop
  prod: production
release:
  major: 3
"#,
        )
        .unwrap()
    }

    fn no_answers() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_no_placeholders_unchanged() {
        let template = "git status --short { not a placeholder }";
        let result = resolve_pure(template, &config(), &no_answers()).unwrap();
        assert_eq!(result, template);
    }

    #[test]
    fn test_substitutes_in_place() {
        let result =
            resolve_pure("git checkout {{branches.prod}} -q", &config(), &no_answers()).unwrap();
        assert_eq!(result, "git checkout production -q");
    }

    #[test]
    fn test_multiple_placeholders_left_to_right() {
        let result = resolve_pure(
            "{{branches.development}}..{{branches.prod}} ({{project_name}})",
            &config(),
            &no_answers(),
        )
        .unwrap();
        assert_eq!(result, "develop..production (demo)");
    }

    #[test]
    fn test_repeated_placeholder() {
        let result =
            resolve_pure("{{project_name}}-{{project_name}}", &config(), &no_answers()).unwrap();
        assert_eq!(result, "demo-demo");
    }

    #[test]
    fn test_numeric_scalar() {
        let result = resolve_pure("v{{release.major}}", &config(), &no_answers()).unwrap();
        assert_eq!(result, "v3");
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let result = resolve_pure("{{ branches.prod }}", &config(), &no_answers()).unwrap();
        assert_eq!(result, "production");
    }

    #[test]
    fn test_missing_variable_fails() {
        let err = resolve_pure("git push {{branches.staging}}", &config(), &no_answers())
            .unwrap_err();
        match err {
            ResolveError::MissingVariable(name) => assert_eq!(name, "branches.staging"),
            other => panic!("Expected MissingVariable, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_after_success_returns_nothing() {
        // The first placeholder resolves but the second does not
        let result = resolve_pure("{{branches.prod}} {{nope}}", &config(), &no_answers());
        assert!(matches!(result, Err(ResolveError::MissingVariable(_))));
    }

    #[test]
    fn test_non_scalar_fails() {
        let result = resolve_pure("echo {{branches}}", &config(), &no_answers());
        assert!(matches!(result, Err(ResolveError::NotScalar(name)) if name == "branches"));
    }

    #[test]
    fn test_version_needs_input() {
        let result = resolve_pure("git tag v{{version}}", &config(), &no_answers());
        assert!(matches!(result, Err(ResolveError::NeedsInput(name)) if name == "version"));
    }

    #[test]
    fn test_version_from_answers() {
        let mut answers = HashMap::new();
        answers.insert("version".to_string(), "1.4.0".to_string());

        let result = resolve_pure("git tag v{{version}}", &config(), &answers).unwrap();
        assert_eq!(result, "git tag v1.4.0");
    }

    #[test]
    fn test_version_in_tree_wins() {
        let config = WorkflowConfig::from_yaml_str("version: 9.9.9\n").unwrap();
        let result = resolve_pure("v{{version}}", &config, &no_answers()).unwrap();
        assert_eq!(result, "v9.9.9");
    }

    #[test]
    fn test_padded_version_is_not_reserved() {
        let result = resolve_pure("v{{ version }}", &config(), &no_answers());
        assert!(matches!(result, Err(ResolveError::MissingVariable(_))));
    }

    #[test]
    fn test_resolver_prompts_for_version() {
        let mut prompt = ScriptedPrompt::new(["2.0.0"]);
        let mut resolver = Resolver::new(&mut prompt);

        let result = resolver.resolve("git tag v{{version}}", &config()).unwrap();
        assert_eq!(result, "git tag v2.0.0");
        assert_eq!(resolver.answers().get("version").unwrap(), "2.0.0");
        drop(resolver);
        assert_eq!(prompt.asked().len(), 1);
        assert!(prompt.asked()[0].contains("version"));
    }

    #[test]
    fn test_resolver_trims_answer() {
        let mut prompt = ScriptedPrompt::new(["  1.2.3  "]);
        let mut resolver = Resolver::new(&mut prompt);

        let result = resolver.resolve("v{{version}}", &config()).unwrap();
        assert_eq!(result, "v1.2.3");
    }

    #[test]
    fn test_resolver_empty_answer_fails() {
        let mut prompt = ScriptedPrompt::new([""]);
        let mut resolver = Resolver::new(&mut prompt);

        let result = resolver.resolve("git tag v{{version}}", &config());
        assert!(matches!(result, Err(ResolveError::EmptyInput(_))));
    }

    #[test]
    fn test_resolver_reuses_answer() {
        let mut prompt = ScriptedPrompt::new(["5.0.0"]);
        let mut resolver = Resolver::new(&mut prompt);

        let tag = resolver.resolve("git tag v{{version}}", &config()).unwrap();
        let push = resolver.resolve("git push origin v{{version}}", &config()).unwrap();

        assert_eq!(tag, "git tag v5.0.0");
        assert_eq!(push, "git push origin v5.0.0");
        drop(resolver);
        assert_eq!(prompt.asked().len(), 1);
    }

    #[test]
    fn test_resolver_no_prompt_when_not_needed() {
        let mut prompt = ScriptedPrompt::new(Vec::<&str>::new());
        let mut resolver = Resolver::new(&mut prompt);

        let result = resolver.resolve("git checkout {{branches.development}}", &config());
        assert_eq!(result.unwrap(), "git checkout develop");
        drop(resolver);
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_placeholders_listing() {
        assert_eq!(placeholders("{{a}} and {{b.c}}"), vec!["a", "b.c"]);
        assert!(placeholders("plain").is_empty());
    }

    #[test]
    fn test_unterminated_placeholder() {
        assert!(has_unterminated_placeholder("git tag v{{version"));
        assert!(!has_unterminated_placeholder("git tag v{{version}}"));
        assert!(!has_unterminated_placeholder("echo }}"));
    }
}
