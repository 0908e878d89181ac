use std::any::Any;
use std::sync::Arc;

use tether_text::VirtualFileId;
use tether_tree::{Element, ElementType, StubPath, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind};

/// Points into a compiled file by stub index path.
///
/// Survives reloads of the compiled file as long as the structure up to the
/// element is unchanged.
#[derive(Debug)]
pub struct StubElementInfo {
    file: VirtualFileId,
    path: StubPath,
    expected: ElementType,
}

impl StubElementInfo {
    /// Tracks the element at `path` in `file`.
    pub fn new(file: VirtualFileId, path: StubPath, expected: ElementType) -> Self {
        Self {
            file,
            path,
            expected,
        }
    }

    /// The stub index path.
    pub fn path(&self) -> &[u32] {
        &self.path
    }
}

impl ElementInfo for StubElementInfo {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        ws.stub_element(self.file, &self.path)
            .filter(|e| e.element_type() == self.expected)
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        Some(self.file)
    }

    fn element_hash(&self) -> u64 {
        hash_of((self.file, &self.path))
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|o| {
            o.file == self.file && o.path == self.path && o.expected == self.expected
        })
    }

    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::Stub
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
