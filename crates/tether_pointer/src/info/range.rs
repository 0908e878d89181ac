use std::any::Any;
use std::sync::{Arc, Mutex};

use tether_common::Ident;
use tether_text::{RangeMarker, TextRange, VirtualFileId};
use tether_tree::{find_element, Element, ElementType, Workspace};

use super::{hash_of, ElementInfo, ElementInfoKind};

#[derive(Debug)]
enum Anchor {
    /// Moved by the document on every edit.
    Fastened(Arc<RangeMarker>),
    /// Frozen between `unfasten_belt` and `fasten_belt`; `None` once the
    /// tracked text is gone.
    Unfastened(Option<TextRange>),
}

impl Anchor {
    fn range(&self) -> Option<TextRange> {
        match self {
            Anchor::Fastened(marker) => marker.range(),
            Anchor::Unfastened(range) => *range,
        }
    }
}

/// A range in the document of `file`, kept current across edits.
#[derive(Debug)]
pub(crate) struct TrackedRange {
    file: VirtualFileId,
    anchor: Mutex<Anchor>,
}

impl TrackedRange {
    /// Tracks `range` of the current text of `file`. Returns `None` if the
    /// file has no document or the range is out of bounds.
    pub fn new(ws: &Workspace, file: VirtualFileId, range: TextRange) -> Option<Self> {
        let marker = ws.document(file)?.create_marker(range).ok()?;
        Some(Self {
            file,
            anchor: Mutex::new(Anchor::Fastened(marker)),
        })
    }

    /// A range whose text was already deleted.
    pub fn lost(file: VirtualFileId) -> Self {
        Self {
            file,
            anchor: Mutex::new(Anchor::Unfastened(None)),
        }
    }

    pub fn file(&self) -> VirtualFileId {
        self.file
    }

    pub fn range(&self) -> Option<TextRange> {
        self.anchor.lock().unwrap().range()
    }

    pub fn unfasten(&self) {
        let mut anchor = self.anchor.lock().unwrap();
        let frozen = anchor.range();
        *anchor = Anchor::Unfastened(frozen);
    }

    pub fn fasten(&self, ws: &Workspace, range: Option<TextRange>) {
        let mut anchor = self.anchor.lock().unwrap();
        let refastened = match (range, anchor.range()) {
            (Some(range), Some(_)) => ws
                .document(self.file)
                .and_then(|doc| doc.create_marker(range).ok()),
            _ => None,
        };
        *anchor = match refastened {
            Some(marker) => Anchor::Fastened(marker),
            None => Anchor::Unfastened(None),
        };
    }
}

/// Tracks an element by its text range and type.
///
/// Resolution commits the file and looks for the innermost element whose
/// range equals the tracked range and whose type is the expected one. When
/// `root_language` is set the search runs in that language's root of a
/// multi-root file instead of the primary root.
#[derive(Debug)]
pub struct RangeElementInfo {
    tracked: TrackedRange,
    expected: ElementType,
    root_language: Option<Ident>,
}

impl RangeElementInfo {
    pub(crate) fn new(
        tracked: TrackedRange,
        expected: ElementType,
        root_language: Option<Ident>,
    ) -> Self {
        Self {
            tracked,
            expected,
            root_language,
        }
    }

    /// The expected element type.
    pub fn expected_type(&self) -> ElementType {
        self.expected
    }
}

impl ElementInfo for RangeElementInfo {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        let view = ws.view(self.tracked.file())?;
        let range = self.tracked.range()?;
        let root = match self.root_language {
            Some(language) => view.root(language)?,
            None => view.primary_root(),
        };
        find_element(root, range, self.expected)
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        Some(self.tracked.file())
    }

    fn range(&self) -> Option<TextRange> {
        self.tracked.range()
    }

    fn element_hash(&self) -> u64 {
        hash_of((self.tracked.file(), self.expected))
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        if other.tracked.file() != self.tracked.file()
            || other.expected != self.expected
            || other.root_language != self.root_language
        {
            return false;
        }
        match (self.range(), other.range()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn unfasten_belt(&self) {
        self.tracked.unfasten();
    }

    fn fasten_belt(&self, ws: &Workspace, range: Option<TextRange>) {
        self.tracked.fasten(ws, range);
    }

    fn kind(&self) -> ElementInfoKind {
        if self.root_language.is_some() {
            ElementInfoKind::MultiRootRange
        } else {
            ElementInfoKind::Range
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
