//! `tether clean`: remove outputs and persisted build state.

use std::path::Path;

use crate::project::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `tether clean` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = tether_config::load_config(&project_dir)?;

    for dir in [config.output_root(&project_dir), config.data_root(&project_dir)] {
        if remove_dir(&dir)? && !global.quiet {
            eprintln!("    Removed {}", dir.display());
        }
    }
    Ok(0)
}

/// Removes `dir` recursively; returns `false` if it did not exist.
fn remove_dir(dir: &Path) -> Result<bool, std::io::Error> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_dir_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out/production/core");
        std::fs::create_dir_all(&out).unwrap();
        assert!(remove_dir(&dir.path().join("out")).unwrap());
        assert!(!remove_dir(&dir.path().join("out")).unwrap());
    }
}
