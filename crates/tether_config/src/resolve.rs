//! Module resolution: absolute roots, excludes and output directories.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, RootKind};
use std::path::{Path, PathBuf};

/// A source or resource root with its path made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    /// Absolute root directory.
    pub path: PathBuf,
    /// What the root holds.
    pub kind: RootKind,
    /// Dot-separated package prefix, possibly empty.
    pub package_prefix: String,
    /// Whether the root is generated.
    pub generated: bool,
}

/// A module with every path resolved against the project directory.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// Module name.
    pub name: String,
    /// Roots in declaration order.
    pub roots: Vec<ResolvedRoot>,
    /// Absolute excluded directories.
    pub excludes: Vec<PathBuf>,
    /// Names of the modules this one depends on.
    pub dependencies: Vec<String>,
    /// `<output>/production/<module>`.
    pub production_output: PathBuf,
    /// `<output>/test/<module>`.
    pub test_output: PathBuf,
}

impl ResolvedModule {
    /// Output directory for production or test artifacts.
    pub fn output_dir(&self, tests: bool) -> &Path {
        if tests {
            &self.test_output
        } else {
            &self.production_output
        }
    }

    /// Returns `true` if `path` lies under one of the module's excludes.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.excludes.iter().any(|ex| path.starts_with(ex))
    }
}

impl ProjectConfig {
    /// Absolute output directory.
    pub fn output_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.project.output)
    }

    /// Absolute directory for persisted build state.
    pub fn data_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.project.data_dir)
    }
}

/// Resolves the module `name` against `project_dir`.
pub fn resolve_module(
    config: &ProjectConfig,
    project_dir: &Path,
    name: &str,
) -> Result<ResolvedModule, ConfigError> {
    let module = config
        .modules
        .get(name)
        .ok_or_else(|| ConfigError::UnknownModule(name.to_string()))?;

    let roots = module
        .roots
        .iter()
        .map(|root| ResolvedRoot {
            path: project_dir.join(&root.path),
            kind: root.kind,
            package_prefix: root.package_prefix.clone(),
            generated: root.generated,
        })
        .collect();
    let excludes = module
        .excludes
        .iter()
        .map(|ex| project_dir.join(ex))
        .collect();
    let output = config.output_root(project_dir);

    Ok(ResolvedModule {
        name: name.to_string(),
        roots,
        excludes,
        dependencies: module.dependencies.clone(),
        production_output: output.join("production").join(name),
        test_output: output.join("test").join(name),
    })
}
