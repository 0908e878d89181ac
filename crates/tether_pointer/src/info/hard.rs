use std::any::Any;
use std::sync::Arc;

use tether_text::VirtualFileId;
use tether_tree::{Element, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind};

/// Holds the element strongly. Used where there is nothing stable to
/// re-anchor to: light elements, non-physical files, unindexed compiled code.
#[derive(Debug)]
pub struct HardElementInfo {
    element: Arc<Element>,
}

impl HardElementInfo {
    /// Wraps `element`.
    pub fn new(element: Arc<Element>) -> Self {
        Self { element }
    }
}

impl ElementInfo for HardElementInfo {
    fn restore_element(&self, _ws: &Workspace) -> Option<Arc<Element>> {
        Some(Arc::clone(&self.element))
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        self.element.containing_file()
    }

    fn element_hash(&self) -> u64 {
        hash_of(self.element.id())
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| Arc::ptr_eq(&self.element, &o.element))
    }

    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::Hard
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
