//! Tree elements: files, directories, syntax nodes and compiled stubs.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tether_common::{Ident, InternalError, TetherResult};
use tether_text::{TextRange, VirtualFileId};

/// Unique identity of an element within one [`Workspace`](crate::Workspace).
///
/// Ids are never reused, so a reparsed node gets a new id even when it covers
/// the same text as its predecessor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ElementId(u64);

impl ElementId {
    /// Creates an id from a raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// The runtime type of an element, checked on every pointer resolution.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ElementType {
    /// The root of a file (one per language root).
    File,
    /// A directory pseudo-element.
    Directory,
    /// A syntax node of the given interned kind.
    Node(Ident),
}

/// Index path from a compiled file's root down to a stub element.
pub type StubPath = Vec<u32>;

/// Where an element comes from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ElementOrigin {
    /// Parsed from the text of a source file.
    Source,
    /// Materialized from a compiled file. `stub_path` is `None` for parts of
    /// the compiled form that are not indexed in the stub tree.
    Compiled {
        /// Position in the stub tree, when indexed.
        stub_path: Option<StubPath>,
    },
    /// Created in memory, not backed by any file.
    Light,
}

/// A node of an element tree.
///
/// Elements are shared through `Arc` and never mutated structurally: a reparse
/// builds a new tree and marks every element of the old one invalid.
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) element_type: ElementType,
    pub(crate) language: Ident,
    pub(crate) virtual_file: Option<VirtualFileId>,
    pub(crate) range: Option<TextRange>,
    pub(crate) name: Option<String>,
    pub(crate) children: Vec<Arc<Element>>,
    pub(crate) physical: bool,
    pub(crate) origin: ElementOrigin,
    pub(crate) valid: AtomicBool,
}

impl Element {
    /// Unique id of this element.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Runtime type.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Language of the tree this element belongs to.
    pub fn language(&self) -> Ident {
        self.language
    }

    /// The virtual file this element is, or lives in.
    ///
    /// For a directory this is the directory itself; for light elements it is
    /// `None`.
    pub fn virtual_file(&self) -> Option<VirtualFileId> {
        self.virtual_file
    }

    /// The file containing this element. Directories have none.
    pub fn containing_file(&self) -> Option<VirtualFileId> {
        if self.is_directory() {
            None
        } else {
            self.virtual_file
        }
    }

    /// Text range at the time of parsing; `None` for directories, compiled
    /// and light elements.
    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    /// Declared name, if the parser recorded one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Child elements in source order.
    pub fn children(&self) -> &[Arc<Element>] {
        &self.children
    }

    /// `false` for light elements and for elements of non-physical files.
    pub fn is_physical(&self) -> bool {
        self.physical
    }

    /// Origin of this element.
    pub fn origin(&self) -> &ElementOrigin {
        &self.origin
    }

    /// Returns `true` for file roots.
    pub fn is_file(&self) -> bool {
        self.element_type == ElementType::File
    }

    /// Returns `true` for directories.
    pub fn is_directory(&self) -> bool {
        self.element_type == ElementType::Directory
    }

    /// Returns `true` for elements materialized from a compiled file.
    pub fn is_compiled(&self) -> bool {
        matches!(self.origin, ElementOrigin::Compiled { .. })
    }

    /// Stub path of a compiled element, when it is indexed.
    pub fn stub_path(&self) -> Option<&[u32]> {
        match &self.origin {
            ElementOrigin::Compiled { stub_path } => stub_path.as_deref(),
            _ => None,
        }
    }

    /// Returns `false` once the tree holding this element was replaced or its
    /// file deleted.
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Fails with an [`InternalError`] when the element is no longer valid.
    ///
    /// Touching an invalid element directly is a caller bug; pointers should
    /// be used to hold on to elements across edits.
    pub fn ensure_valid(&self) -> TetherResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(InternalError::new(format!(
                "element {:?} accessed after its tree was replaced",
                self.id
            )))
        }
    }

    /// Iterates over this element and all its descendants in pre-order.
    pub fn descendants(self: &Arc<Self>) -> Descendants {
        Descendants {
            stack: vec![Arc::clone(self)],
        }
    }

    pub(crate) fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
        for child in &self.children {
            child.invalidate();
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("type", &self.element_type)
            .field("file", &self.virtual_file)
            .field("range", &self.range)
            .field("name", &self.name)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants {
    stack: Vec<Arc<Element>>,
}

impl Iterator for Descendants {
    type Item = Arc<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev().cloned());
        Some(next)
    }
}

/// Everything needed to allocate an element except its id.
pub(crate) struct ElementSeed {
    pub element_type: ElementType,
    pub language: Ident,
    pub virtual_file: Option<VirtualFileId>,
    pub range: Option<TextRange>,
    pub name: Option<String>,
    pub physical: bool,
    pub origin: ElementOrigin,
}

impl ElementSeed {
    pub fn build(self, id: ElementId, children: Vec<Arc<Element>>) -> Arc<Element> {
        Arc::new(Element {
            id,
            element_type: self.element_type,
            language: self.language,
            virtual_file: self.virtual_file,
            range: self.range,
            name: self.name,
            children,
            physical: self.physical,
            origin: self.origin,
            valid: AtomicBool::new(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, children: Vec<Arc<Element>>) -> Arc<Element> {
        ElementSeed {
            element_type: ElementType::Node(Ident::from_raw(0)),
            language: Ident::from_raw(1),
            virtual_file: Some(VirtualFileId::from_raw(0)),
            range: Some(TextRange::new(0, 1)),
            name: None,
            physical: true,
            origin: ElementOrigin::Source,
        }
        .build(ElementId::from_raw(id), children)
    }

    #[test]
    fn descendants_preorder() {
        let tree = node(0, vec![node(1, vec![node(2, vec![])]), node(3, vec![])]);
        let ids: Vec<u64> = tree.descendants().map(|e| e.id().as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn invalidate_is_recursive() {
        let leaf = node(2, vec![]);
        let tree = node(0, vec![node(1, vec![Arc::clone(&leaf)])]);
        assert!(leaf.is_valid());
        tree.invalidate();
        assert!(!leaf.is_valid());
        assert!(leaf.ensure_valid().is_err());
    }

    #[test]
    fn origin_queries() {
        let compiled = ElementSeed {
            element_type: ElementType::Node(Ident::from_raw(0)),
            language: Ident::from_raw(1),
            virtual_file: Some(VirtualFileId::from_raw(4)),
            range: None,
            name: Some("run".to_string()),
            physical: true,
            origin: ElementOrigin::Compiled {
                stub_path: Some(vec![0, 2]),
            },
        }
        .build(ElementId::from_raw(9), vec![]);
        assert!(compiled.is_compiled());
        assert_eq!(compiled.stub_path(), Some(&[0, 2][..]));
        assert_eq!(compiled.containing_file(), Some(VirtualFileId::from_raw(4)));
    }
}
