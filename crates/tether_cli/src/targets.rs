//! `tether targets`: list target chunks in build order.

use tether_build::BuildTargetIndex;

use crate::project::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `tether targets` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = tether_config::load_config(&project_dir)?;
    let index = BuildTargetIndex::from_config(&config);

    for (i, chunk) in index.sorted_chunks().iter().enumerate() {
        println!("{:>3}  {chunk}", i + 1);
    }
    Ok(0)
}
