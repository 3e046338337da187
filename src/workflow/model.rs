//! Workflow Data Model
//!
//! Core data structures for the workflow configuration file and the
//! resolved plan produced from it.
//!
//! # Example YAML Format
//!
//! ```yaml
//! project_name: my-service
//!
//! branches:
//!   development: develop
//!   production: main
//!
//! hooks:
//!   pre_merge:
//!     - cargo fmt --check
//!     - cargo test
//!
//! workflows:
//!   release:
//!     - description: Run checks
//!       run: hooks:pre_merge
//!     - description: Merge into production
//!       run: git merge_to_branch:{{branches.production}}
//!     - description: Tag the release
//!       run: git tag v{{version}}
//! ```

use std::collections::HashMap;

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Marker prefix for a hook group macro step.
pub const HOOK_PREFIX: &str = "hooks:";

/// Marker prefix for a guarded merge macro step.
pub const MERGE_PREFIX: &str = "git merge_to_branch:";

/// Project name shown when the configuration omits one.
pub const UNNAMED_PROJECT: &str = "Unnamed Project";

/// A single declared step of a workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StepDef {
    /// Human-readable summary shown in the plan and progress lines
    #[serde(default = "default_description")]
    pub description: String,

    /// Command template, possibly a macro marker
    #[serde(default)]
    pub run: String,
}

fn default_description() -> String {
    "No description".to_string()
}

impl StepDef {
    /// Creates a step definition.
    ///
    /// ```
    /// use gitease::workflow::StepDef;
    ///
    /// let step = StepDef::new("Tag the release", "git tag v{{version}}");
    /// assert_eq!(step.run, "git tag v{{version}}");
    /// ```
    pub fn new(description: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            run: run.into(),
        }
    }
}

/// A named, ordered list of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    pub name: String,
    pub steps: Vec<StepDef>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, steps: Vec<StepDef>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Returns the number of declared steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the workflow declares no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Typed view over the recognised top-level keys.
#[derive(Deserialize, Debug, Default)]
struct ConfigSections {
    #[serde(default)]
    project_name: Option<String>,

    #[serde(default, deserialize_with = "ordered_workflows")]
    workflows: Vec<Workflow>,

    #[serde(default, deserialize_with = "null_as_empty")]
    hooks: HashMap<String, Vec<String>>,
}

/// Deserializes the `workflows` mapping while keeping declaration order.
fn ordered_workflows<'de, D>(deserializer: D) -> Result<Vec<Workflow>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    let map = match val {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(map) => map,
        _ => return Err(D::Error::custom("Expected `workflows` to be a mapping")),
    };

    map.into_iter()
        .map(|(key, steps)| -> Result<Workflow, D::Error> {
            let name = match key {
                Value::String(s) => s,
                other => scalar_text(&other)
                    .ok_or_else(|| D::Error::custom("Workflow names must be scalars"))?,
            };
            let steps: Vec<StepDef> = match steps {
                Value::Null => Vec::new(),
                other => serde_yaml::from_value(other).map_err(|e| {
                    D::Error::custom(format!("Invalid steps for workflow '{}': {}", name, e))
                })?,
            };
            Ok(Workflow { name, steps })
        })
        .collect()
}

/// Treats an explicit `hooks:` with no value as an empty mapping.
fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<HashMap<String, Vec<String>>>::deserialize(deserializer)
        .map(|hooks| hooks.unwrap_or_default())
}

/// The loaded workflow configuration.
///
/// Holds the typed sections plus the whole document tree, which serves as
/// the namespace for `{{dotted.path}}` placeholders. Nothing in the crate
/// mutates a configuration after it has been built.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub project_name: Option<String>,
    pub workflows: Vec<Workflow>,
    pub hooks: HashMap<String, Vec<String>>,
    tree: Value,
}

impl WorkflowConfig {
    /// Builds a configuration from a parsed YAML document.
    pub fn from_value(tree: Value) -> Result<Self, serde_yaml::Error> {
        let sections: ConfigSections = match tree {
            Value::Null => ConfigSections::default(),
            ref other => serde_yaml::from_value(other.clone())?,
        };

        Ok(Self {
            project_name: sections.project_name,
            workflows: sections.workflows,
            hooks: sections.hooks,
            tree,
        })
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let tree: Value = serde_yaml::from_str(text)?;
        Self::from_value(tree)
    }

    /// Returns the project name, or a placeholder when none is configured.
    pub fn display_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or(UNNAMED_PROJECT)
    }

    /// Looks up a workflow by name.
    pub fn workflow(&self, name: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.name == name)
    }

    /// Returns workflow names in declaration order.
    pub fn workflow_names(&self) -> Vec<&str> {
        self.workflows.iter().map(|w| w.name.as_str()).collect()
    }

    /// Returns the commands of a hook group, if it is defined.
    pub fn hook(&self, name: &str) -> Option<&[String]> {
        self.hooks.get(name).map(|cmds| cmds.as_slice())
    }

    /// Walks the document tree along a key path.
    ///
    /// Returns `None` as soon as a segment is missing or the current node
    /// is not a mapping.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter().try_fold(&self.tree, |node, key| match node {
            Value::Mapping(map) => mapping_get(map, key.as_ref()),
            _ => None,
        })
    }
}

fn mapping_get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        // Keys such as `2` or `true` are parsed as non-string scalars
        map.iter()
            .find(|(k, _)| !k.is_string() && scalar_text(k).as_deref() == Some(key))
            .map(|(_, v)| v)
    })
}

/// Renders a scalar YAML value as substitution text.
///
/// Returns `None` for nulls, sequences, mappings and tagged values.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The concrete action a planned step performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Hand the text to the shell as-is
    Command(String),
    /// Run every command of the named hook group in order
    HookGroup(String),
    /// Merge the current branch into the target and switch back
    GuardedMerge(String),
}

impl StepAction {
    /// Classifies a fully resolved command by its macro prefix.
    ///
    /// ```
    /// use gitease::workflow::StepAction;
    ///
    /// assert_eq!(
    ///     StepAction::classify("hooks:lint"),
    ///     StepAction::HookGroup("lint".to_string())
    /// );
    /// assert_eq!(
    ///     StepAction::classify("git merge_to_branch: main"),
    ///     StepAction::GuardedMerge("main".to_string())
    /// );
    /// assert_eq!(
    ///     StepAction::classify("git push"),
    ///     StepAction::Command("git push".to_string())
    /// );
    /// ```
    pub fn classify(command: &str) -> Self {
        if let Some(rest) = command.strip_prefix(HOOK_PREFIX) {
            Self::HookGroup(macro_target(rest))
        } else if let Some(rest) = command.strip_prefix(MERGE_PREFIX) {
            Self::GuardedMerge(macro_target(rest))
        } else {
            Self::Command(command.to_string())
        }
    }

    /// Returns true for hook group and guarded merge steps.
    pub fn is_macro(&self) -> bool {
        !matches!(self, Self::Command(_))
    }
}

/// The macro argument ends at the next ':' and is trimmed.
fn macro_target(rest: &str) -> String {
    rest.split(':').next().unwrap_or_default().trim().to_string()
}

/// A step with every placeholder substituted, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub description: String,
    /// Resolved text as shown in the plan preview
    pub resolved_command: String,
    pub action: StepAction,
}

impl PlannedStep {
    pub fn new(description: impl Into<String>, resolved_command: impl Into<String>) -> Self {
        let resolved_command = resolved_command.into();
        Self {
            description: description.into(),
            action: StepAction::classify(&resolved_command),
            resolved_command,
        }
    }
}
