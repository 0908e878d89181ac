//! Registry of virtual files and directories with stable identities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::TextError;
use crate::file_id::VirtualFileId;

/// What a virtual file entry stands for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VirtualFileKind {
    /// A regular file on disk (source or compiled).
    File,
    /// A directory.
    Directory,
    /// A secondary-language buffer living inside a host file.
    Injected {
        /// The file containing the host element.
        host: VirtualFileId,
    },
}

/// One entry of the [`VirtualFileSystem`].
#[derive(Clone, Debug)]
pub struct VirtualFile {
    /// Stable identity of this entry.
    pub id: VirtualFileId,
    /// Filesystem path, or a synthetic path for injected buffers.
    pub path: PathBuf,
    /// Entry kind.
    pub kind: VirtualFileKind,
    /// `false` once the entry was deleted.
    pub valid: bool,
}

impl VirtualFile {
    /// Returns `true` for directory entries.
    pub fn is_directory(&self) -> bool {
        self.kind == VirtualFileKind::Directory
    }

    /// Returns `true` for injected buffers.
    pub fn is_injected(&self) -> bool {
        matches!(self.kind, VirtualFileKind::Injected { .. })
    }
}

/// Hands out [`VirtualFileId`]s and maps paths to live entries.
///
/// Entries are append-only; deletion only flips the `valid` flag and frees the
/// path for a new entry, which gets a fresh id.
#[derive(Debug, Default)]
pub struct VirtualFileSystem {
    files: Vec<VirtualFile>,
    by_path: HashMap<PathBuf, VirtualFileId>,
}

impl VirtualFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file at `path`.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Result<VirtualFileId, TextError> {
        self.add(path.into(), VirtualFileKind::File)
    }

    /// Registers a directory at `path`.
    pub fn add_directory(
        &mut self,
        path: impl Into<PathBuf>,
    ) -> Result<VirtualFileId, TextError> {
        self.add(path.into(), VirtualFileKind::Directory)
    }

    /// Registers an injected buffer hosted by `host`.
    ///
    /// Injected buffers are not reachable by path.
    pub fn add_injected(&mut self, host: VirtualFileId) -> Result<VirtualFileId, TextError> {
        let host_path = self.get(host).ok_or(TextError::UnknownFile(host))?.path.clone();
        let id = VirtualFileId::from_raw(self.files.len() as u32);
        let mut path = host_path.into_os_string();
        path.push(format!("#injected{}", id.as_raw()));
        self.files.push(VirtualFile {
            id,
            path: path.into(),
            kind: VirtualFileKind::Injected { host },
            valid: true,
        });
        Ok(id)
    }

    fn add(&mut self, path: PathBuf, kind: VirtualFileKind) -> Result<VirtualFileId, TextError> {
        if self.by_path.contains_key(&path) {
            return Err(TextError::AlreadyExists(path));
        }
        let id = VirtualFileId::from_raw(self.files.len() as u32);
        self.by_path.insert(path.clone(), id);
        self.files.push(VirtualFile {
            id,
            path,
            kind,
            valid: true,
        });
        Ok(id)
    }

    /// Returns the entry for `id`, valid or not.
    pub fn get(&self, id: VirtualFileId) -> Option<&VirtualFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns `true` if `id` names a live entry.
    pub fn is_valid(&self, id: VirtualFileId) -> bool {
        self.get(id).is_some_and(|f| f.valid)
    }

    /// Finds the live entry at `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<VirtualFileId> {
        self.by_path.get(path).copied()
    }

    /// Marks `id` as deleted and frees its path.
    pub fn delete(&mut self, id: VirtualFileId) -> Result<(), TextError> {
        let file = self
            .files
            .get_mut(id.as_raw() as usize)
            .ok_or(TextError::UnknownFile(id))?;
        file.valid = false;
        if self.by_path.get(&file.path) == Some(&id) {
            self.by_path.remove(&file.path);
        }
        Ok(())
    }

    /// Number of entries ever registered.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing was ever registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_find() {
        let mut vfs = VirtualFileSystem::new();
        let dir = vfs.add_directory("src").unwrap();
        let file = vfs.add_file("src/Main.sx").unwrap();
        assert_ne!(dir, file);
        assert_eq!(vfs.find_by_path(Path::new("src/Main.sx")), Some(file));
        assert!(vfs.get(dir).unwrap().is_directory());
    }

    #[test]
    fn duplicate_path_rejected() {
        let mut vfs = VirtualFileSystem::new();
        vfs.add_file("a.sx").unwrap();
        assert!(matches!(
            vfs.add_file("a.sx"),
            Err(TextError::AlreadyExists(_))
        ));
    }

    #[test]
    fn delete_keeps_id_but_frees_path() {
        let mut vfs = VirtualFileSystem::new();
        let old = vfs.add_file("a.sx").unwrap();
        vfs.delete(old).unwrap();
        assert!(!vfs.is_valid(old));
        assert!(vfs.find_by_path(Path::new("a.sx")).is_none());

        let new = vfs.add_file("a.sx").unwrap();
        assert_ne!(old, new);
        assert!(vfs.is_valid(new));
    }

    #[test]
    fn injected_entries_are_not_path_addressable() {
        let mut vfs = VirtualFileSystem::new();
        let host = vfs.add_file("page.sx").unwrap();
        let injected = vfs.add_injected(host).unwrap();
        let entry = vfs.get(injected).unwrap();
        assert!(entry.is_injected());
        assert_eq!(entry.kind, VirtualFileKind::Injected { host });
        assert_eq!(vfs.find_by_path(&entry.path.clone()), None);
    }

    #[test]
    fn unknown_ids() {
        let mut vfs = VirtualFileSystem::new();
        let ghost = VirtualFileId::from_raw(9);
        assert!(!vfs.is_valid(ghost));
        assert!(vfs.delete(ghost).is_err());
        assert!(vfs.add_injected(ghost).is_err());
    }
}
