//! Incremental copying of resource files into a module's output directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tether_config::ResolvedModule;
use walkdir::WalkDir;

use crate::context::{BuildMessage, CompileContext};
use crate::data::BuildDataManager;
use crate::error::BuildError;
use crate::hasher::SourceHasher;
use crate::outputs::ChunkBuildOutputs;
use crate::patterns::ResourcePatterns;
use crate::resources::{ExcludedRootProvider, ResourceRoot, ResourcesTarget};
use crate::target::TargetChunk;

/// What one run of the [`ResourceBuilder`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceBuildStats {
    /// Whether previous state was discarded and everything copied.
    pub full: bool,
    /// Files copied.
    pub copied: usize,
    /// Stale outputs deleted.
    pub removed: usize,
    /// Files left alone because they did not change.
    pub unchanged: usize,
}

/// A resource file found under a root.
struct ResourceFile {
    source: PathBuf,
    output: PathBuf,
}

/// Copies resources of [`ResourcesTarget`]s, incrementally when possible.
pub struct ResourceBuilder {
    raw_patterns: Vec<String>,
    patterns: ResourcePatterns,
    providers: Vec<Arc<dyn ExcludedRootProvider>>,
}

impl ResourceBuilder {
    /// Creates a builder copying files that match `patterns`.
    pub fn new(patterns: &[String]) -> Result<Self, BuildError> {
        Ok(Self {
            raw_patterns: patterns.to_vec(),
            patterns: ResourcePatterns::new(patterns)?,
            providers: Vec::new(),
        })
    }

    /// Adds a provider of excluded roots.
    pub fn add_excluded_root_provider(&mut self, provider: Arc<dyn ExcludedRootProvider>) {
        self.providers.push(provider);
    }

    /// The patterns this builder was created with.
    pub fn patterns(&self) -> &[String] {
        &self.raw_patterns
    }

    /// Roots of `target` within `module`, with every provider's exclusions.
    pub fn roots(&self, target: &ResourcesTarget, module: &ResolvedModule) -> Vec<ResourceRoot> {
        target.compute_roots(module, &self.providers)
    }

    /// The configuration `target` would be recorded with, as lower-case hex.
    pub fn configuration(
        &self,
        target: &ResourcesTarget,
        roots: &[ResourceRoot],
    ) -> Result<String, BuildError> {
        let mut out = Vec::new();
        target
            .write_configuration(&self.raw_patterns, roots, &mut out)
            .map_err(|e| BuildError::Serialization {
                reason: e.to_string(),
            })?;
        String::from_utf8(out).map_err(|e| BuildError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Copies the resources of `target`.
    ///
    /// Everything is copied when the context does not differentiate the
    /// target's chunk (a rebuild, or a forced full build) or the target's
    /// configuration changed since the last build; otherwise only new and
    /// modified files are copied and outputs of deleted files are removed.
    /// Copied files are registered with `outputs`, which should be backed by
    /// `data` so their outputs can be cleaned up later.
    pub fn build(
        &self,
        ctx: &dyn CompileContext,
        target: &ResourcesTarget,
        module: &ResolvedModule,
        data: &BuildDataManager,
        outputs: &mut ChunkBuildOutputs,
    ) -> Result<ResourceBuildStats, BuildError> {
        let build_target = target.target();
        let roots = self.roots(target, module);
        let configuration = self.configuration(target, &roots)?;
        let chunk = TargetChunk::new(vec![build_target.clone()]);
        let full = !ctx.should_differentiate(&chunk)
            || data.configuration_changed(&build_target, &configuration)?;
        let mut stats = ResourceBuildStats {
            full,
            ..ResourceBuildStats::default()
        };

        ctx.process_message(BuildMessage::Progress(format!(
            "Copying resources... [{}]",
            module.name
        )));

        if full {
            for output in data.recorded_outputs(&build_target)? {
                if remove_output(&output)? {
                    stats.removed += 1;
                }
            }
            data.clean_target(&build_target)?;
        }

        let files = self.collect(target, module, &roots)?;
        let mut hashes = HashMap::with_capacity(files.len());
        for file in &files {
            hashes.insert(file.source.clone(), SourceHasher::hash_file(&file.source)?);
        }
        let changes = data.detect_changes(&build_target, &hashes)?;
        stats.unchanged = changes.unchanged_files.len();

        for deleted in &changes.deleted_files {
            ctx.check_canceled()?;
            for output in data.remove_source(&build_target, deleted)? {
                if remove_output(&output)? {
                    tracing::debug!(output = %output.display(), "stale resource removed");
                    stats.removed += 1;
                }
            }
        }

        let dirty = changes.dirty_files();
        for file in files.iter().filter(|f| dirty.binary_search(&f.source).is_ok()) {
            ctx.check_canceled()?;
            copy_file(&file.source, &file.output)?;
            outputs.register_output_file(&build_target, &file.output, &[file.source.clone()])?;
            if let Some(&hash) = hashes.get(&file.source) {
                data.record_hash(&build_target, &file.source, hash)?;
            }
            stats.copied += 1;
        }

        data.save_configuration(&build_target, &configuration)?;
        data.flush()?;
        tracing::info!(
            module = %module.name,
            tests = target.is_tests(),
            full = stats.full,
            copied = stats.copied,
            removed = stats.removed,
            "resources copied"
        );
        Ok(stats)
    }

    fn collect(
        &self,
        target: &ResourcesTarget,
        module: &ResolvedModule,
        roots: &[ResourceRoot],
    ) -> Result<Vec<ResourceFile>, BuildError> {
        let output_dir = target.output_dir(module);
        let mut files = Vec::new();
        for root in roots {
            if !root.path.is_dir() {
                tracing::debug!(root = %root.path.display(), "resource root missing, skipped");
                continue;
            }
            let walker = WalkDir::new(&root.path)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| !root.is_excluded(entry.path()));
            for entry in walker {
                let entry = entry.map_err(|e| {
                    let path = e.path().unwrap_or(&root.path).to_path_buf();
                    BuildError::io(path, e.into())
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&root.path) else {
                    continue;
                };
                if !self.patterns.is_resource(relative) {
                    continue;
                }
                files.push(ResourceFile {
                    source: entry.path().to_path_buf(),
                    output: output_dir.join(root.prefix_dir()).join(relative),
                });
            }
        }
        Ok(files)
    }
}

fn copy_file(source: &Path, output: &Path) -> Result<(), BuildError> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    std::fs::copy(source, output).map_err(|e| BuildError::io(source, e))?;
    tracing::trace!(source = %source.display(), output = %output.display(), "resource copied");
    Ok(())
}

/// Deletes `output`; returns `false` if it was already gone.
fn remove_output(output: &Path) -> Result<bool, BuildError> {
    match std::fs::remove_file(output) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::io(output, e)),
    }
}
