//! The client-facing smart pointer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tether_text::{TextRange, VirtualFileId};
use tether_tree::{Element, ElementType, Workspace};

use crate::factory::{create_element_info, ElementInfoFactory};
use crate::info::{ElementInfo, ElementInfoKind};

pub(crate) struct PointerInner {
    info: Box<dyn ElementInfo>,
    expected: ElementType,
    cache: Mutex<Weak<Element>>,
    resolves: AtomicUsize,
}

/// A handle to an element that survives reparses of its file.
///
/// The strategy is chosen once at creation. The last resolved element is
/// cached weakly; the cache only saves work and is dropped as soon as the
/// element is invalidated. Cloning is cheap and clones share the cache.
#[derive(Clone)]
pub struct SmartPointer {
    inner: Arc<PointerInner>,
}

impl SmartPointer {
    /// Creates a pointer to `element` using only the built-in strategies.
    pub fn new(ws: &Workspace, element: &Arc<Element>) -> Self {
        Self::with_factories(ws, element, &[])
    }

    /// Creates a pointer to `element`, consulting `factories` for a custom
    /// strategy.
    pub fn with_factories(
        ws: &Workspace,
        element: &Arc<Element>,
        factories: &[Arc<dyn ElementInfoFactory>],
    ) -> Self {
        let info = create_element_info(ws, element, factories);
        Self {
            inner: Arc::new(PointerInner {
                info,
                expected: element.element_type(),
                cache: Mutex::new(Arc::downgrade(element)),
                resolves: AtomicUsize::new(0),
            }),
        }
    }

    /// Returns the element, re-finding it through the strategy when the cached
    /// one is gone or invalid. `None` means the element no longer exists.
    pub fn element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        if let Some(cached) = self.cached() {
            if cached.element_type() == self.inner.expected {
                return Some(cached);
            }
        }
        self.inner.resolves.fetch_add(1, Ordering::Relaxed);
        let restored = self
            .inner
            .info
            .restore_element(ws)
            .filter(|e| e.is_valid() && e.element_type() == self.inner.expected);
        let mut cache = self.inner.cache.lock().unwrap();
        *cache = restored.as_ref().map(Arc::downgrade).unwrap_or_default();
        if restored.is_none() {
            tracing::trace!(strategy = ?self.strategy(), "pointer target not found");
        }
        restored
    }

    /// The file containing the element.
    ///
    /// Uses the file tracked by the strategy when there is one and resolves
    /// the element otherwise. Directories have no containing file.
    pub fn containing_file(&self, ws: &Workspace) -> Option<VirtualFileId> {
        if self.strategy() == ElementInfoKind::Directory {
            return None;
        }
        self.inner
            .info
            .virtual_file()
            .or_else(|| self.element(ws)?.containing_file())
    }

    /// The tracked range; `None` for strategies without one.
    pub fn range(&self) -> Option<TextRange> {
        self.inner.info.range()
    }

    /// Detaches the tracked range before an edit of its document.
    pub fn unfasten_belt(&self) {
        self.inner.info.unfasten_belt();
    }

    /// Re-attaches the tracked range after an edit at its post-edit `range`,
    /// or marks it lost when the edit deleted it (`None`).
    pub fn fasten_belt(&self, ws: &Workspace, range: Option<TextRange>) {
        self.inner.info.fasten_belt(ws, range);
    }

    /// Number of times the strategy had to restore the element.
    pub fn resolve_count(&self) -> usize {
        self.inner.resolves.load(Ordering::Relaxed)
    }

    /// Kind of the strategy in use.
    pub fn strategy(&self) -> ElementInfoKind {
        self.inner.info.kind()
    }

    /// The strategy in use.
    pub fn info(&self) -> &dyn ElementInfo {
        self.inner.info.as_ref()
    }

    /// Type the element must have to be returned.
    pub fn expected_type(&self) -> ElementType {
        self.inner.expected
    }

    fn cached(&self) -> Option<Arc<Element>> {
        let mut cache = self.inner.cache.lock().unwrap();
        match cache.upgrade() {
            Some(element) if element.is_valid() => Some(element),
            Some(_) => {
                *cache = Weak::new();
                None
            }
            None => None,
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<PointerInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<PointerInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn same_handle(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn is_cached(&self, element: &Arc<Element>) -> bool {
        self.cached().is_some_and(|c| Arc::ptr_eq(&c, element))
    }
}

impl PartialEq for SmartPointer {
    /// Never resolves: compares strategies, then cached elements when both
    /// sides have one.
    fn eq(&self, other: &Self) -> bool {
        if self.same_handle(other) {
            return true;
        }
        if !self.inner.info.points_to_same(other.inner.info.as_ref()) {
            return false;
        }
        match (self.cached(), other.cached()) {
            (Some(a), Some(b)) => Arc::ptr_eq(&a, &b),
            _ => true,
        }
    }
}

impl Eq for SmartPointer {}

impl Hash for SmartPointer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.info.element_hash().hash(state);
    }
}

impl fmt::Debug for SmartPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartPointer")
            .field("info", &self.inner.info)
            .field("expected", &self.inner.expected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_text::TextEdit;
    use tether_tree::SexprParser;

    fn setup() -> (Workspace, VirtualFileId) {
        let ws = Workspace::new();
        ws.register_parser("sx", SexprParser);
        let file = ws
            .add_file("Main.sx", "sx", "(class Main (method run) (method stop))")
            .unwrap();
        (ws, file)
    }

    fn method(ws: &Workspace, file: VirtualFileId, index: usize) -> Arc<Element> {
        ws.find_file(file).unwrap().children()[0].children()[index].clone()
    }

    #[test]
    fn cached_element_skips_restore() {
        let (ws, file) = setup();
        let run = method(&ws, file, 0);
        let pointer = SmartPointer::new(&ws, &run);
        assert!(Arc::ptr_eq(&pointer.element(&ws).unwrap(), &run));
        assert_eq!(pointer.resolve_count(), 0);
    }

    #[test]
    fn restores_after_cache_drop() {
        let (ws, file) = setup();
        let pointer = SmartPointer::new(&ws, &method(&ws, file, 1));
        ws.edit(file, TextEdit::insert(0, " ")).unwrap();
        ws.commit(file).unwrap();
        let restored = pointer.element(&ws).unwrap();
        assert_eq!(restored.name(), Some("stop"));
        assert_eq!(pointer.resolve_count(), 1);
        assert_eq!(pointer.range(), restored.range());
    }

    #[test]
    fn containing_file_fast_path() {
        let (ws, file) = setup();
        let pointer = SmartPointer::new(&ws, &method(&ws, file, 0));
        ws.edit(file, TextEdit::insert(0, " ")).unwrap();
        ws.commit(file).unwrap();
        assert_eq!(pointer.containing_file(&ws), Some(file));
        assert_eq!(pointer.resolve_count(), 0);
    }

    #[test]
    fn stale_cache_does_not_break_equality() {
        let (ws, file) = setup();
        let old_run = method(&ws, file, 0);
        let a = SmartPointer::new(&ws, &old_run);
        let b = SmartPointer::new(&ws, &old_run);
        ws.edit(file, TextEdit::insert(0, " ")).unwrap();
        ws.commit(file).unwrap();

        let new_run = a.element(&ws).unwrap();
        assert!(!Arc::ptr_eq(&new_run, &old_run));
        assert!(!old_run.is_valid());
        assert_eq!(a, b);
        assert!(b.cached().is_none());
    }

    #[test]
    fn clones_share_cache_and_compare_equal() {
        let (ws, file) = setup();
        let pointer = SmartPointer::new(&ws, &method(&ws, file, 0));
        let clone = pointer.clone();
        assert_eq!(pointer, clone);
        assert!(pointer.same_handle(&clone));
    }

    #[test]
    fn different_elements_differ() {
        let (ws, file) = setup();
        let run = SmartPointer::new(&ws, &method(&ws, file, 0));
        let stop = SmartPointer::new(&ws, &method(&ws, file, 1));
        assert_ne!(run, stop);
    }
}
