//! Persisted build state for every target of a project.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tether_common::ContentHash;

use crate::error::BuildError;
use crate::hasher::{ChangeSet, SourceHasher};
use crate::manifest::TargetState;
use crate::target::BuildTarget;

#[derive(Debug, Default)]
struct LoadedState {
    state: TargetState,
    dirty: bool,
}

/// Owns the [`TargetState`] of every target under one data directory.
///
/// States are loaded lazily on first use and written back by
/// [`flush`](Self::flush). The state of `target` lives at
/// `<data_dir>/targets/<kind>/<module>.json`.
#[derive(Debug)]
pub struct BuildDataManager {
    data_dir: PathBuf,
    states: Mutex<HashMap<BuildTarget, LoadedState>>,
}

impl BuildDataManager {
    /// Creates a manager rooted at `data_dir`. Nothing is read until a
    /// target's state is first needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the state of `target` is stored.
    pub fn state_path(&self, target: &BuildTarget) -> PathBuf {
        self.data_dir
            .join("targets")
            .join(target.kind().id())
            .join(format!("{}.json", target.module()))
    }

    fn with_state<R>(
        &self,
        target: &BuildTarget,
        modify: bool,
        f: impl FnOnce(&mut TargetState) -> R,
    ) -> Result<R, BuildError> {
        let mut states = self.states.lock().unwrap();
        let loaded = match states.entry(target.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let state = TargetState::load(&self.state_path(target))?.unwrap_or_default();
                entry.insert(LoadedState {
                    state,
                    dirty: false,
                })
            }
        };
        loaded.dirty |= modify;
        Ok(f(&mut loaded.state))
    }

    /// Returns `true` if `configuration` differs from the one saved for
    /// `target`, or none was saved.
    pub fn configuration_changed(
        &self,
        target: &BuildTarget,
        configuration: &str,
    ) -> Result<bool, BuildError> {
        self.with_state(target, false, |state| {
            state.configuration.as_deref() != Some(configuration)
        })
    }

    /// Records the configuration `target` was built with.
    pub fn save_configuration(
        &self,
        target: &BuildTarget,
        configuration: &str,
    ) -> Result<(), BuildError> {
        self.with_state(target, true, |state| {
            state.configuration = Some(configuration.to_string());
        })
    }

    /// Records that `sources` contributed to `output`.
    pub fn append_outputs(
        &self,
        target: &BuildTarget,
        sources: &[PathBuf],
        output: &Path,
    ) -> Result<(), BuildError> {
        self.with_state(target, true, |state| state.append_output(sources, output))
    }

    /// Outputs recorded for `source`.
    pub fn outputs_of(
        &self,
        target: &BuildTarget,
        source: &Path,
    ) -> Result<Vec<PathBuf>, BuildError> {
        self.with_state(target, false, |state| {
            state.outputs.get(source).cloned().unwrap_or_default()
        })
    }

    /// Every output recorded for `target`.
    pub fn recorded_outputs(&self, target: &BuildTarget) -> Result<Vec<PathBuf>, BuildError> {
        self.with_state(target, false, |state| state.all_outputs())
    }

    /// Forgets `source`, returning the outputs it had produced.
    pub fn remove_source(
        &self,
        target: &BuildTarget,
        source: &Path,
    ) -> Result<Vec<PathBuf>, BuildError> {
        self.with_state(target, true, |state| state.remove_source(source))
    }

    /// Records the content hash `source` was processed with.
    pub fn record_hash(
        &self,
        target: &BuildTarget,
        source: &Path,
        hash: ContentHash,
    ) -> Result<(), BuildError> {
        self.with_state(target, true, |state| {
            state.hashes.insert(source.to_path_buf(), hash);
        })
    }

    /// Compares `current` hashes against the ones recorded for `target`.
    pub fn detect_changes(
        &self,
        target: &BuildTarget,
        current: &HashMap<PathBuf, ContentHash>,
    ) -> Result<ChangeSet, BuildError> {
        self.with_state(target, false, |state| {
            SourceHasher::detect_changes(current, &state.hashes)
        })
    }

    /// Drops everything recorded for `target`, on disk and in memory.
    pub fn clean_target(&self, target: &BuildTarget) -> Result<(), BuildError> {
        let path = self.state_path(target);
        self.states.lock().unwrap().remove(target);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BuildError::io(path, e)),
        }
    }

    /// Writes every modified state to disk.
    pub fn flush(&self) -> Result<(), BuildError> {
        let mut states = self.states.lock().unwrap();
        for (target, loaded) in states.iter_mut().filter(|(_, l)| l.dirty) {
            loaded.state.save(&self.state_path(target))?;
            loaded.dirty = false;
            tracing::trace!(build_target = %target, "target state saved");
        }
        Ok(())
    }
}
