//! Resource file hashing and change detection.
//!
//! Computes content hashes for the files of a target and compares them against
//! the target's persisted state to identify which files are new, modified,
//! deleted, or unchanged since the last build.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tether_common::ContentHash;

use crate::error::BuildError;

/// Result of comparing current file hashes against the recorded ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files that have no recorded hash.
    pub new_files: Vec<PathBuf>,

    /// Files whose content hash differs from the recorded one.
    pub modified_files: Vec<PathBuf>,

    /// Files with a recorded hash that are not in the current file set.
    pub deleted_files: Vec<PathBuf>,

    /// Files whose content hash matches the recorded one.
    pub unchanged_files: Vec<PathBuf>,
}

impl ChangeSet {
    /// Returns `true` if there are no changes (no new, modified, or deleted files).
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }

    /// Returns the total number of files that need reprocessing (new + modified).
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }

    /// New and modified files, sorted.
    pub fn dirty_files(&self) -> Vec<PathBuf> {
        let mut dirty: Vec<PathBuf> = self
            .new_files
            .iter()
            .chain(&self.modified_files)
            .cloned()
            .collect();
        dirty.sort();
        dirty
    }
}

/// Utility for computing content hashes of files and detecting changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the XXH3-128 content hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, BuildError> {
        let content = std::fs::read(path).map_err(|e| BuildError::io(path, e))?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Computes content hashes for multiple files.
    pub fn hash_files(paths: &[PathBuf]) -> Result<HashMap<PathBuf, ContentHash>, BuildError> {
        let mut hashes = HashMap::with_capacity(paths.len());
        for path in paths {
            hashes.insert(path.clone(), Self::hash_file(path)?);
        }
        Ok(hashes)
    }

    /// Compares current file hashes against the recorded ones.
    pub fn detect_changes(
        current_hashes: &HashMap<PathBuf, ContentHash>,
        recorded: &BTreeMap<PathBuf, ContentHash>,
    ) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (path, hash) in current_hashes {
            match recorded.get(path) {
                Some(old) if old == hash => changes.unchanged_files.push(path.clone()),
                Some(_) => changes.modified_files.push(path.clone()),
                None => changes.new_files.push(path.clone()),
            }
        }
        changes.deleted_files = recorded
            .keys()
            .filter(|p| !current_hashes.contains_key(*p))
            .cloned()
            .collect();

        changes.new_files.sort();
        changes.modified_files.sort();
        changes.unchanged_files.sort();
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_file_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.properties");
        std::fs::write(&path, "name=app").unwrap();

        let h1 = SourceHasher::hash_file(&path).unwrap();
        let h2 = SourceHasher::hash_file(&path).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceHasher::hash_file(&dir.path().join("gone.txt")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn detect_all_categories() {
        let mut recorded = BTreeMap::new();
        recorded.insert(PathBuf::from("same"), ContentHash::from_bytes(b"1"));
        recorded.insert(PathBuf::from("changed"), ContentHash::from_bytes(b"2"));
        recorded.insert(PathBuf::from("gone"), ContentHash::from_bytes(b"3"));

        let mut current = HashMap::new();
        current.insert(PathBuf::from("same"), ContentHash::from_bytes(b"1"));
        current.insert(PathBuf::from("changed"), ContentHash::from_bytes(b"2'"));
        current.insert(PathBuf::from("fresh"), ContentHash::from_bytes(b"4"));

        let changes = SourceHasher::detect_changes(&current, &recorded);
        assert_eq!(changes.new_files, vec![PathBuf::from("fresh")]);
        assert_eq!(changes.modified_files, vec![PathBuf::from("changed")]);
        assert_eq!(changes.deleted_files, vec![PathBuf::from("gone")]);
        assert_eq!(changes.unchanged_files, vec![PathBuf::from("same")]);
        assert_eq!(changes.dirty_count(), 2);
        assert_eq!(
            changes.dirty_files(),
            vec![PathBuf::from("changed"), PathBuf::from("fresh")]
        );
        assert!(!changes.is_empty());
    }

    #[test]
    fn nothing_changed() {
        let mut recorded = BTreeMap::new();
        recorded.insert(PathBuf::from("a"), ContentHash::from_bytes(b"a"));
        let current: HashMap<_, _> = recorded.clone().into_iter().collect();
        assert!(SourceHasher::detect_changes(&current, &recorded).is_empty());
    }
}
