//! Element-info strategies: how a pointer remembers and re-finds its element.

mod directory;
mod file;
mod hard;
mod injected;
mod range;
mod stub;

pub use directory::DirectoryElementInfo;
pub use file::FileElementInfo;
pub use hard::HardElementInfo;
pub use injected::InjectedElementInfo;
pub use range::RangeElementInfo;
pub use stub::StubElementInfo;

pub(crate) use range::TrackedRange;

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tether_text::{TextRange, VirtualFileId};
use tether_tree::{Element, Workspace};

/// Which strategy a pointer uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ElementInfoKind {
    /// Strong reference, no re-anchoring.
    Hard,
    /// Root of a file for one language.
    File,
    /// A directory.
    Directory,
    /// A tracked range in a single-root file.
    Range,
    /// A tracked range in a non-primary root of a multi-root file.
    MultiRootRange,
    /// A tracked range inside an injected fragment.
    Injected,
    /// An index path into a compiled file's stub tree.
    Stub,
    /// Supplied by an [`ElementInfoFactory`](crate::ElementInfoFactory).
    Custom,
}

/// Remembers enough about an element to find it again after its tree was
/// replaced.
///
/// A strategy never holds the element itself (except [`HardElementInfo`]);
/// [`restore_element`](Self::restore_element) re-derives it from the current
/// state of the workspace and returns `None` when that is no longer possible.
pub trait ElementInfo: Send + Sync + fmt::Debug {
    /// Re-finds the element in the current trees of `ws`.
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>>;

    /// The virtual file the element lives in, when the strategy tracks one.
    fn virtual_file(&self) -> Option<VirtualFileId>;

    /// The file whose document edits move this strategy's range.
    fn anchor_file(&self) -> Option<VirtualFileId> {
        self.virtual_file()
    }

    /// Current tracked range, for strategies that have one.
    fn range(&self) -> Option<TextRange> {
        None
    }

    /// Hash that stays stable across re-resolution.
    fn element_hash(&self) -> u64;

    /// Returns `true` if both strategies denote the same element, judged from
    /// their metadata only.
    fn points_to_same(&self, other: &dyn ElementInfo) -> bool;

    /// Detaches the tracked range from its document before an edit.
    fn unfasten_belt(&self) {}

    /// Re-attaches the tracked range after an edit at its post-edit `range`,
    /// or drops it when the edit removed the tracked text (`None`).
    fn fasten_belt(&self, _ws: &Workspace, _range: Option<TextRange>) {}

    /// Strategy kind.
    fn kind(&self) -> ElementInfoKind {
        ElementInfoKind::Custom
    }

    /// Upcast for strategy-specific comparisons.
    fn as_any(&self) -> &dyn Any;
}

pub(crate) fn hash_of(value: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
