//! Round-scoped bookkeeping of what each target produced.
//!
//! A [`ChunkBuildOutputs`] is owned by the build session and reused across
//! rounds: it is populated while a chunk compiles, reports every generated
//! file once the round completes, and is then cleared for the next round.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::artifact::CompiledArtifact;
use crate::context::{BuildMessage, CompileContext, FileGeneratedEvent, GeneratedFile};
use crate::data::BuildDataManager;
use crate::error::BuildError;
use crate::target::BuildTarget;

/// Output files of one target mapped to the sources that contributed to them.
///
/// Both outputs and the sources of each output keep registration order.
#[derive(Debug, Clone, Default)]
pub struct TargetOutputs {
    outputs: IndexMap<PathBuf, IndexSet<PathBuf>>,
}

impl TargetOutputs {
    /// Adds `sources` to the contributors of `output`.
    pub fn register(&mut self, output: &Path, sources: &[PathBuf]) {
        self.outputs
            .entry(output.to_path_buf())
            .or_default()
            .extend(sources.iter().cloned());
    }

    /// Contributors of `output`, if it was registered.
    pub fn sources_of(&self, output: &Path) -> Option<&IndexSet<PathBuf>> {
        self.outputs.get(output)
    }

    /// Outputs with their contributors, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &IndexSet<PathBuf>)> {
        self.outputs.iter()
    }

    /// Number of distinct outputs.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    fn to_event(&self, target: &BuildTarget) -> FileGeneratedEvent {
        FileGeneratedEvent {
            target: target.clone(),
            files: self
                .outputs
                .iter()
                .map(|(output, sources)| GeneratedFile {
                    output: output.clone(),
                    sources: sources.iter().cloned().collect(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum RoundState {
    Empty,
    Populating,
    Fired,
}

/// Collects the outputs of one chunk build round.
#[derive(Debug)]
pub struct ChunkBuildOutputs {
    target_classes: HashMap<BuildTarget, Vec<Arc<CompiledArtifact>>>,
    classes: HashMap<String, Arc<CompiledArtifact>>,
    target_outputs: IndexMap<BuildTarget, TargetOutputs>,
    state: RoundState,
    data: Option<Arc<BuildDataManager>>,
}

impl Default for ChunkBuildOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkBuildOutputs {
    /// Creates an empty consumer that keeps outputs in memory only.
    pub fn new() -> Self {
        Self {
            target_classes: HashMap::new(),
            classes: HashMap::new(),
            target_outputs: IndexMap::new(),
            state: RoundState::Empty,
            data: None,
        }
    }

    /// Creates an empty consumer that also records every output file in
    /// `data`, so the next build can remove outputs of deleted sources.
    pub fn with_data(data: Arc<BuildDataManager>) -> Self {
        Self {
            data: Some(data),
            ..Self::new()
        }
    }

    fn begin_registration(&mut self) -> Result<(), BuildError> {
        match self.state {
            RoundState::Fired => Err(BuildError::RoundFinalized),
            RoundState::Empty | RoundState::Populating => {
                self.state = RoundState::Populating;
                Ok(())
            }
        }
    }

    /// Records a compiled artifact of `target`.
    ///
    /// A named artifact replaces any artifact previously registered under the
    /// same name, in any target. The artifact's output is registered as
    /// generated from its source first; if that fails nothing is recorded.
    pub fn register_compiled_class(
        &mut self,
        target: &BuildTarget,
        artifact: CompiledArtifact,
    ) -> Result<(), BuildError> {
        self.register_output_file(target, &artifact.output, &[artifact.source.clone()])?;
        let artifact = Arc::new(artifact);
        if let Some(name) = &artifact.class_name {
            if self.classes.insert(name.clone(), Arc::clone(&artifact)).is_some() {
                tracing::trace!(class = %name, "compiled class replaced");
            }
        }
        self.target_classes
            .entry(target.clone())
            .or_default()
            .push(artifact);
        Ok(())
    }

    /// Records that `sources` contributed to `output` of `target`.
    ///
    /// Repeated calls for the same output accumulate the union of sources.
    pub fn register_output_file(
        &mut self,
        target: &BuildTarget,
        output: &Path,
        sources: &[PathBuf],
    ) -> Result<(), BuildError> {
        self.begin_registration()?;
        if let Some(data) = &self.data {
            data.append_outputs(target, sources, output)?;
        }
        self.target_outputs
            .entry(target.clone())
            .or_default()
            .register(output, sources);
        Ok(())
    }

    /// Artifacts registered for `target` this round, in registration order.
    pub fn target_compiled_classes(&self, target: &BuildTarget) -> &[Arc<CompiledArtifact>] {
        self.target_classes
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every named artifact registered this round.
    pub fn compiled_classes(&self) -> &HashMap<String, Arc<CompiledArtifact>> {
        &self.classes
    }

    /// Content of the artifact registered as `name`.
    pub fn lookup_class_bytes(&self, name: &str) -> Option<&[u8]> {
        self.classes.get(name).map(|a| &a.content[..])
    }

    /// Output files of `target` registered this round.
    pub fn target_outputs(&self, target: &BuildTarget) -> Option<&TargetOutputs> {
        self.target_outputs.get(target)
    }

    /// Total number of output files registered this round.
    pub fn output_count(&self) -> usize {
        self.target_outputs.values().map(TargetOutputs::len).sum()
    }

    /// Returns `true` once this round's events were fired.
    pub fn is_finalized(&self) -> bool {
        self.state == RoundState::Fired
    }

    /// Reports the outputs of every target through `ctx`, one event per
    /// target that produced something, in the order targets first registered.
    ///
    /// Fails with [`BuildError::EventsAlreadyFired`] when called twice in a
    /// round.
    pub fn fire_file_generated_events(
        &mut self,
        ctx: &dyn CompileContext,
    ) -> Result<(), BuildError> {
        if self.state == RoundState::Fired {
            return Err(BuildError::EventsAlreadyFired);
        }
        for (target, outputs) in &self.target_outputs {
            if !outputs.is_empty() {
                ctx.process_message(BuildMessage::FileGenerated(outputs.to_event(target)));
            }
        }
        tracing::debug!(
            targets = self.target_outputs.len(),
            outputs = self.output_count(),
            "round finalized"
        );
        self.state = RoundState::Fired;
        Ok(())
    }

    /// Forgets everything registered, ready for the next round.
    pub fn clear(&mut self) {
        self.target_classes.clear();
        self.classes.clear();
        self.target_outputs.clear();
        self.state = RoundState::Empty;
    }
}
