//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::collections::HashSet;
use std::path::Path;

/// Name of the configuration file in a project directory.
pub const CONFIG_FILE: &str = "tether.toml";

/// Loads and validates `tether.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tether.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks required fields and cross-module references.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    for (name, module) in &config.modules {
        for dep in &module.dependencies {
            if !config.modules.contains_key(dep) {
                return Err(ConfigError::UnknownModule(dep.clone()));
            }
            if dep == name {
                return Err(ConfigError::ValidationError(format!(
                    "module '{name}' depends on itself"
                )));
            }
        }
        let mut seen = HashSet::new();
        for root in &module.roots {
            if root.path.is_empty() {
                return Err(ConfigError::MissingField(format!(
                    "modules.{name}.roots.path"
                )));
            }
            if !seen.insert(root.path.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "module '{name}' declares root '{}' twice",
                    root.path
                )));
            }
        }
    }
    Ok(())
}
