use std::any::Any;
use std::sync::Arc;

use tether_text::VirtualFileId;
use tether_tree::{Element, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind};

/// Points at a directory by its virtual file id.
#[derive(Debug)]
pub struct DirectoryElementInfo {
    dir: VirtualFileId,
}

impl DirectoryElementInfo {
    /// Tracks `dir`.
    pub fn new(dir: VirtualFileId) -> Self {
        Self { dir }
    }
}

impl ElementInfo for DirectoryElementInfo {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        ws.find_directory(self.dir)
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        Some(self.dir)
    }

    fn element_hash(&self) -> u64 {
        hash_of(self.dir)
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.dir == self.dir)
    }

    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::Directory
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
