//! Persisted per-target build state.
//!
//! Each target's state is stored as one JSON file. It records the target's
//! configuration fingerprint, a content hash for every processed source and
//! the outputs each source produced, so the next build can tell what changed
//! and which outputs became stale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tether_common::ContentHash;

use crate::error::BuildError;

/// Build state of one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetState {
    /// Configuration fingerprint written by the target, as lower-case hex.
    #[serde(default)]
    pub configuration: Option<String>,

    /// Content hash of every source processed by the last build.
    #[serde(default)]
    pub hashes: BTreeMap<PathBuf, ContentHash>,

    /// Outputs produced from each source.
    #[serde(default)]
    pub outputs: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl TargetState {
    /// Loads the state stored at `path`.
    ///
    /// A missing file is a fresh target and yields `Ok(None)`; any other I/O
    /// failure or a corrupt file is an error.
    pub fn load(path: &Path) -> Result<Option<Self>, BuildError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BuildError::io(path, e)),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| BuildError::ManifestParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Saves the state to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), BuildError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| BuildError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| BuildError::io(path, e))
    }

    /// Adds `output` to the outputs of each of `sources`, keeping each list
    /// free of duplicates.
    pub fn append_output(&mut self, sources: &[PathBuf], output: &Path) {
        for source in sources {
            let outputs = self.outputs.entry(source.clone()).or_default();
            if !outputs.iter().any(|o| o == output) {
                outputs.push(output.to_path_buf());
            }
        }
    }

    /// Forgets `source`, returning the outputs it had produced.
    pub fn remove_source(&mut self, source: &Path) -> Vec<PathBuf> {
        self.hashes.remove(source);
        self.outputs.remove(source).unwrap_or_default()
    }

    /// Every recorded output, without duplicates.
    pub fn all_outputs(&self) -> Vec<PathBuf> {
        let mut all: Vec<PathBuf> = self.outputs.values().flatten().cloned().collect();
        all.sort();
        all.dedup();
        all
    }
}
