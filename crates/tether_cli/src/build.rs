//! `tether build`: incremental resource build.
//!
//! 1. Find the project root and load `tether.toml`
//! 2. Order every target into chunks, dependencies first
//! 3. For each chunk, copy the resources of its resources targets
//! 4. Fire file generated events and clear the consumer between chunks

use std::sync::Arc;

use tether_build::{
    BuildDataManager, BuildMode, BuildSession, BuildTargetIndex, ChunkBuildOutputs, MessageLog,
    ResourceBuilder, ResourcesTarget,
};
use tether_config::resolve_module;

use crate::project::resolve_project_root;
use crate::{BuildArgs, GlobalArgs};

/// Runs the `tether build` command. Returns exit code 0 on success.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = tether_config::load_config(&project_dir)?;
    let mode = if args.rebuild {
        BuildMode::Rebuild
    } else {
        BuildMode::Make
    };

    if !global.quiet {
        eprintln!("   Building {} ({mode:?})", config.project.name);
    }

    let data = Arc::new(BuildDataManager::new(config.data_root(&project_dir)));
    let builder = ResourceBuilder::new(&config.compiler.resource_patterns)?;
    let log = Arc::new(MessageLog::new());
    let mut session = BuildSession::new(mode);
    session.add_listener(log.clone());

    let index = BuildTargetIndex::from_config(&config);
    let mut outputs = ChunkBuildOutputs::with_data(Arc::clone(&data));
    let (mut copied, mut removed) = (0, 0);

    for chunk in index.sorted_chunks() {
        let resources: Vec<_> = chunk
            .targets()
            .iter()
            .filter(|t| t.kind().is_resources())
            .collect();
        if resources.is_empty() {
            tracing::debug!(chunk = %chunk, "no resources targets in chunk");
            continue;
        }

        for target in resources {
            let module = resolve_module(&config, &project_dir, target.module())?;
            let resources_target = ResourcesTarget::new(target.module(), target.kind().is_tests());
            let stats = builder.build(&session, &resources_target, &module, &data, &mut outputs)?;
            if global.verbose {
                eprintln!(
                    "   {target}: {} copied, {} removed, {} unchanged{}",
                    stats.copied,
                    stats.removed,
                    stats.unchanged,
                    if stats.full { " (full)" } else { "" }
                );
            }
            copied += stats.copied;
            removed += stats.removed;
        }

        outputs.fire_file_generated_events(&session)?;
        outputs.clear();
    }

    let generated: usize = log.file_events().iter().map(|e| e.files.len()).sum();
    if !global.quiet {
        eprintln!(
            "    Finished: {copied} copied, {removed} removed, {generated} files generated"
        );
    }
    Ok(0)
}
