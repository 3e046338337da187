//! Workflow Configuration Loader
//!
//! Reads the `.gitease/workflow.yml` document and builds a
//! [`WorkflowConfig`] from it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use super::model::WorkflowConfig;

/// Configuration directory, relative to the project root.
pub const CONFIG_DIR: &str = ".gitease";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "workflow.yml";

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing YAML file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Returns the conventional configuration path under `root`.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Loads a workflow configuration from a YAML file.
///
/// # Example
///
/// ```rust,no_run
/// use gitease::workflow::load_config;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_config(".gitease/workflow.yml")?;
///     println!("Loaded {} workflows", config.workflows.len());
///     Ok(())
/// }
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<WorkflowConfig, ConfigError> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let yaml_content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    debug!("YAML content loaded ({} bytes)", yaml_content.len());

    let config = WorkflowConfig::from_yaml_str(&yaml_content).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        "Parsed {} workflows, {} hook groups",
        config.workflows.len(),
        config.hooks.len()
    );

    Ok(config)
}
