use std::any::Any;
use std::sync::Arc;

use tether_text::{TextRange, VirtualFileId};
use tether_tree::{find_element, Element, ElementType, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind, TrackedRange};

/// Tracks an element of an injected fragment through its host.
///
/// The host element has its own strategy. The element's range is tracked in
/// the host file's document in absolute coordinates, so edits to the host
/// file move it like any other range. Resolution re-finds the host, obtains
/// its current injected root and searches it with the range expressed
/// relative to the host.
#[derive(Debug)]
pub struct InjectedElementInfo {
    host: Box<dyn ElementInfo>,
    tracked: TrackedRange,
    expected: ElementType,
}

impl InjectedElementInfo {
    pub(crate) fn new(
        host: Box<dyn ElementInfo>,
        tracked: TrackedRange,
        expected: ElementType,
    ) -> Self {
        Self {
            host,
            tracked,
            expected,
        }
    }

    /// Strategy of the host element.
    pub fn host(&self) -> &dyn ElementInfo {
        self.host.as_ref()
    }
}

impl ElementInfo for InjectedElementInfo {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        let host = self.host.restore_element(ws)?;
        let injected_root = ws.injected_root(&host)?;
        let relative = self.tracked.range()?.relative_to(host.range()?)?;
        find_element(&injected_root, relative, self.expected)
    }

    /// Injected views are recreated whenever their host file is reparsed, so
    /// no file id is stable enough to return here.
    fn virtual_file(&self) -> Option<VirtualFileId> {
        None
    }

    fn anchor_file(&self) -> Option<VirtualFileId> {
        Some(self.tracked.file())
    }

    fn range(&self) -> Option<TextRange> {
        self.tracked.range()
    }

    fn element_hash(&self) -> u64 {
        hash_of((self.host.element_hash(), self.expected))
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        other.expected == self.expected
            && self.host.points_to_same(other.host.as_ref())
            && matches!((self.range(), other.range()), (Some(a), Some(b)) if a == b)
    }

    /// Only the element's own range is detached; the host strategy keeps
    /// following the document on its own.
    fn unfasten_belt(&self) {
        self.tracked.unfasten();
    }

    fn fasten_belt(&self, ws: &Workspace, range: Option<TextRange>) {
        self.tracked.fasten(ws, range);
    }

    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::Injected
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
