//! Pointer registry: one pointer per live element, belts per file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock, Weak};

use tether_text::{shift_range, TextEdit, VirtualFileId};
use tether_tree::{Element, ElementId, TreeError, Workspace};

use crate::factory::ElementInfoFactory;
use crate::pointer::{PointerInner, SmartPointer};

/// Creates and tracks smart pointers for a workspace.
///
/// Asking twice for a pointer to the same live element returns the same
/// pointer. Pointers are held weakly; the registry forgets them once every
/// handle is dropped.
#[derive(Default)]
pub struct SmartPointerManager {
    factories: RwLock<Vec<Arc<dyn ElementInfoFactory>>>,
    by_element: Mutex<HashMap<ElementId, Weak<PointerInner>>>,
    by_file: Mutex<HashMap<VirtualFileId, Vec<Weak<PointerInner>>>>,
}

impl SmartPointerManager {
    /// Creates a manager with no custom factories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy factory. Factories are consulted in registration
    /// order.
    pub fn register_factory(&self, factory: impl ElementInfoFactory + 'static) {
        self.factories.write().unwrap().push(Arc::new(factory));
    }

    /// Returns a pointer to `element`, reusing the existing one when the
    /// element already has a live pointer.
    pub fn create_pointer(&self, ws: &Workspace, element: &Arc<Element>) -> SmartPointer {
        let mut by_element = self.by_element.lock().unwrap();
        if let Some(existing) = by_element.get(&element.id()).and_then(SmartPointer::upgrade) {
            if existing.is_cached(element) {
                return existing;
            }
        }
        by_element.retain(|_, weak| weak.strong_count() > 0);

        let factories = self.factories.read().unwrap().clone();
        let pointer = SmartPointer::with_factories(ws, element, &factories);
        by_element.insert(element.id(), pointer.downgrade());
        drop(by_element);

        if let Some(file) = pointer.info().anchor_file() {
            self.by_file
                .lock()
                .unwrap()
                .entry(file)
                .or_default()
                .push(pointer.downgrade());
        }
        pointer
    }

    /// Live pointers anchored in `file`.
    pub fn pointers_in(&self, file: VirtualFileId) -> Vec<SmartPointer> {
        let mut by_file = self.by_file.lock().unwrap();
        let Some(pointers) = by_file.get_mut(&file) else {
            return Vec::new();
        };
        pointers.retain(|weak| weak.strong_count() > 0);
        pointers.iter().filter_map(SmartPointer::upgrade).collect()
    }

    /// Number of live pointers anchored in `file`.
    pub fn pointer_count(&self, file: VirtualFileId) -> usize {
        self.pointers_in(file).len()
    }

    /// Detaches every pointer of `file` from its document before an edit.
    pub fn unfasten_belts(&self, file: VirtualFileId) {
        for pointer in self.pointers_in(file) {
            pointer.unfasten_belt();
        }
    }

    /// Re-attaches every pointer of `file` after `edit` was applied, moving
    /// each frozen range across the edit. Ranges enclosing the edit grow or
    /// shrink with it.
    pub fn fasten_belts(&self, ws: &Workspace, file: VirtualFileId, edit: &TextEdit) {
        for pointer in self.pointers_in(file) {
            let shifted = pointer.range().and_then(|range| shift_range(range, edit));
            pointer.fasten_belt(ws, shifted);
        }
    }

    /// Applies `edit` to `file` with every pointer of the file unfastened for
    /// the duration of the edit.
    pub fn edit_with_belts(
        &self,
        ws: &Workspace,
        file: VirtualFileId,
        edit: TextEdit,
    ) -> Result<(), TreeError> {
        self.unfasten_belts(file);
        let result = ws.edit(file, edit.clone());
        match &result {
            Ok(()) => self.fasten_belts(ws, file, &edit),
            Err(_) => {
                for pointer in self.pointers_in(file) {
                    pointer.fasten_belt(ws, pointer.range());
                }
            }
        }
        result
    }

    /// Returns `true` if both pointers denote the same element.
    pub fn point_to_same_element(&self, a: &SmartPointer, b: &SmartPointer) -> bool {
        a == b
    }

    /// Forgets `pointer`. Other handles to it keep working but are no longer
    /// reused or bracketed by belt operations.
    pub fn remove_pointer(&self, pointer: &SmartPointer) {
        let is_other = |weak: &Weak<PointerInner>| {
            SmartPointer::upgrade(weak).is_some_and(|p| !p.same_handle(pointer))
        };
        self.by_element.lock().unwrap().retain(|_, weak| is_other(weak));
        for pointers in self.by_file.lock().unwrap().values_mut() {
            pointers.retain(|weak| is_other(weak));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_text::TextRange;
    use tether_tree::SexprParser;

    fn setup() -> (Workspace, VirtualFileId) {
        let ws = Workspace::new();
        ws.register_parser("sx", SexprParser);
        let file = ws.add_file("a.sx", "sx", "(class A (method m) (method n))").unwrap();
        (ws, file)
    }

    #[test]
    fn same_element_same_pointer() {
        let (ws, file) = setup();
        let manager = SmartPointerManager::new();
        let class = ws.find_file(file).unwrap().children()[0].clone();
        let a = manager.create_pointer(&ws, &class);
        let b = manager.create_pointer(&ws, &class);
        assert!(a.same_handle(&b));
        assert_eq!(manager.pointer_count(file), 1);
    }

    #[test]
    fn dropped_pointers_are_forgotten() {
        let (ws, file) = setup();
        let manager = SmartPointerManager::new();
        let class = ws.find_file(file).unwrap().children()[0].clone();
        let pointer = manager.create_pointer(&ws, &class);
        drop(pointer);
        assert_eq!(manager.pointer_count(file), 0);
    }

    #[test]
    fn belts_bracket_an_edit() {
        let (ws, file) = setup();
        let manager = SmartPointerManager::new();
        let root = ws.find_file(file).unwrap();
        let n = manager.create_pointer(&ws, &root.children()[0].children()[1]);
        let m = manager.create_pointer(&ws, &root.children()[0].children()[0]);

        manager
            .edit_with_belts(&ws, file, TextEdit::insert(0, ";;\n"))
            .unwrap();
        assert_eq!(n.range(), Some(TextRange::new(23, 33)));

        manager
            .edit_with_belts(&ws, file, TextEdit::delete(TextRange::new(12, 22)))
            .unwrap();
        assert_eq!(m.range(), None);
        assert_eq!(n.range(), Some(TextRange::new(13, 23)));
        assert!(m.element(&ws).is_none());
        assert_eq!(n.element(&ws).unwrap().name(), Some("n"));
    }

    #[test]
    fn belted_range_follows_edit_inside_element() {
        let ws = Workspace::new();
        ws.register_parser("sx", SexprParser);
        let file = ws.add_file("a.sx", "sx", "(class A (method m))").unwrap();
        let manager = SmartPointerManager::new();
        let class = manager.create_pointer(&ws, &ws.find_file(file).unwrap().children()[0]);

        manager
            .edit_with_belts(&ws, file, TextEdit::insert(18, "mm"))
            .unwrap();
        assert_eq!(class.range(), Some(TextRange::new(0, 22)));

        ws.commit(file).unwrap();
        let restored = class.element(&ws).unwrap();
        assert_eq!(restored.name(), Some("A"));
        assert_eq!(restored.range(), Some(TextRange::new(0, 22)));
    }

    #[test]
    fn failed_edit_keeps_ranges() {
        let (ws, file) = setup();
        let manager = SmartPointerManager::new();
        let class = ws.find_file(file).unwrap().children()[0].clone();
        let pointer = manager.create_pointer(&ws, &class);
        let before = pointer.range();
        let err = manager.edit_with_belts(&ws, file, TextEdit::insert(999, "x"));
        assert!(err.is_err());
        assert_eq!(pointer.range(), before);
    }

    #[test]
    fn remove_pointer_stops_reuse() {
        let (ws, file) = setup();
        let manager = SmartPointerManager::new();
        let class = ws.find_file(file).unwrap().children()[0].clone();
        let first = manager.create_pointer(&ws, &class);
        manager.remove_pointer(&first);
        assert_eq!(manager.pointer_count(file), 0);
        let second = manager.create_pointer(&ws, &class);
        assert!(!first.same_handle(&second));
        assert!(manager.point_to_same_element(&first, &second));
    }
}
