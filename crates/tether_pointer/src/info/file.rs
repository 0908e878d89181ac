use std::any::Any;
use std::sync::Arc;

use tether_common::Ident;
use tether_text::VirtualFileId;
use tether_tree::{Element, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind};

/// Points at the root of a file for one language.
#[derive(Debug)]
pub struct FileElementInfo {
    file: VirtualFileId,
    language: Ident,
}

impl FileElementInfo {
    /// Tracks the `language` root of `file`.
    pub fn new(file: VirtualFileId, language: Ident) -> Self {
        Self { file, language }
    }
}

impl ElementInfo for FileElementInfo {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        ws.file_root(self.file, self.language)
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        Some(self.file)
    }

    fn element_hash(&self) -> u64 {
        hash_of(self.file)
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.file == self.file && o.language == self.language)
    }

    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::File
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
