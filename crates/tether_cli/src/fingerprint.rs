//! `tether fingerprint`: print a resources target's configuration fingerprint.

use std::io::Write;

use tether_build::{ResourceBuilder, ResourcesTarget};
use tether_config::resolve_module;

use crate::project::resolve_project_root;
use crate::{FingerprintArgs, GlobalArgs};

/// Runs the `tether fingerprint` command.
///
/// Prints the fingerprint as lower-case hex on stdout, in the same form the
/// build persists it.
pub fn run(args: &FingerprintArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = tether_config::load_config(&project_dir)?;
    let module = resolve_module(&config, &project_dir, &args.module)?;

    let builder = ResourceBuilder::new(&config.compiler.resource_patterns)?;
    let target = ResourcesTarget::new(args.module.as_str(), args.tests);
    let roots = builder.roots(&target, &module);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    target.write_configuration(builder.patterns(), &roots, &mut out)?;
    writeln!(out)?;
    Ok(0)
}
