//! Locating the project a command runs on.

use std::path::{Path, PathBuf};

use tether_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `tether.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory from global CLI args.
///
/// `--project` may name the directory or its `tether.toml`. Without it the
/// current directory and its parents are searched.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.project {
        Some(project) => {
            let path = PathBuf::from(project);
            if path.is_file() {
                Ok(path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(path)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}
