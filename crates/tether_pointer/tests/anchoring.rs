use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use tether_pointer::{
    ElementInfo, ElementInfoFactory, ElementInfoKind, SmartPointer, SmartPointerManager,
};
use tether_text::{TextEdit, TextRange, VirtualFileId};
use tether_tree::{Element, SexprParser, StubNode, Workspace};

const MAIN: &str = "(class Main (method run) (method stop))";

fn workspace() -> Workspace {
    let ws = Workspace::new();
    ws.register_parser("sx", SexprParser);
    ws.register_parser("query", SexprParser);
    ws
}

fn child(ws: &Workspace, file: VirtualFileId, path: &[usize]) -> Arc<Element> {
    let mut current = ws.find_file(file).unwrap();
    for &index in path {
        current = current.children()[index].clone();
    }
    current
}

#[test]
fn resolves_to_same_element_while_text_is_unchanged() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let run = child(&ws, file, &[0, 0]);
    let pointer = SmartPointer::new(&ws, &run);
    for _ in 0..3 {
        assert!(Arc::ptr_eq(&pointer.element(&ws).unwrap(), &run));
    }
}

#[test]
fn survives_edit_before_element() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let pointer = SmartPointer::new(&ws, &child(&ws, file, &[0, 1]));

    ws.edit(file, TextEdit::insert(12, "(field count) ")).unwrap();
    ws.commit(file).unwrap();
    let stop = pointer.element(&ws).unwrap();
    assert_eq!(stop.name(), Some("stop"));
    assert_eq!(stop.range(), Some(TextRange::new(39, 52)));
    assert_eq!(stop.element_type(), ws.node_type("method"));
}

#[test]
fn survives_edit_with_belts() {
    let ws = workspace();
    let manager = SmartPointerManager::new();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let pointer = manager.create_pointer(&ws, &child(&ws, file, &[0, 1]));

    manager.unfasten_belts(file);
    let edit = TextEdit::replace(TextRange::new(7, 11), "Application");
    ws.edit(file, edit.clone()).unwrap();
    manager.fasten_belts(&ws, file, &edit);
    assert_eq!(pointer.range(), Some(TextRange::new(32, 45)));
    ws.commit(file).unwrap();

    let stop = pointer.element(&ws).unwrap();
    assert_eq!(stop.name(), Some("stop"));
    assert_eq!(ws.element_text(&stop).unwrap().as_deref(), Some("(method stop)"));
}

#[test]
fn pointer_created_over_uncommitted_edits() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let stop = child(&ws, file, &[0, 1]);
    ws.edit(file, TextEdit::insert(0, "   ")).unwrap();

    // `stop` still carries its pre-edit range.
    let pointer = SmartPointer::new(&ws, &stop);
    assert_eq!(pointer.range(), Some(TextRange::new(28, 41)));
    ws.commit(file).unwrap();
    assert_eq!(pointer.element(&ws).unwrap().name(), Some("stop"));
}

#[test]
fn deleted_element_resolves_to_none() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let pointer = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));

    ws.edit(file, TextEdit::delete(TextRange::new(12, 25))).unwrap();
    // The cached element stays usable until the file is committed.
    assert!(pointer.element(&ws).is_some());
    ws.commit(file).unwrap();
    assert!(pointer.element(&ws).is_none());
}

#[test]
fn replaced_element_is_not_reinterpreted() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let pointer = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));

    // Same length, different kind: the range now holds a `field`.
    ws.edit(file, TextEdit::replace(TextRange::new(12, 24), "(field  run)"))
        .unwrap();
    ws.commit(file).unwrap();
    let field = child(&ws, file, &[0, 0]);
    assert_eq!(field.range(), Some(TextRange::new(12, 24)));
    assert!(pointer.element(&ws).is_none());
}

#[test]
fn edit_inside_element_grows_its_range() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let class = SmartPointer::new(&ws, &child(&ws, file, &[0]));
    let run = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));

    ws.edit(file, TextEdit::insert(23, "ning")).unwrap();
    ws.commit(file).unwrap();
    assert_eq!(class.element(&ws).unwrap().name(), Some("Main"));
    assert_eq!(run.element(&ws).unwrap().name(), Some("running"));
}

#[test]
fn deleted_file_resolves_to_none() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let root = SmartPointer::new(&ws, &ws.find_file(file).unwrap());
    let run = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));
    ws.delete_file(file).unwrap();
    assert!(root.element(&ws).is_none());
    assert!(run.element(&ws).is_none());
}

#[test]
fn equality_does_not_resolve() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let a = SmartPointer::new(&ws, &child(&ws, file, &[0, 1]));
    let b = SmartPointer::new(&ws, &child(&ws, file, &[0, 1]));
    let other = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));

    // Reparse so neither pointer has a live cached element.
    ws.edit(file, TextEdit::insert(0, " ")).unwrap();
    ws.commit(file).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, other);
    let set: HashSet<SmartPointer> = [a.clone(), b.clone()].into_iter().collect();
    assert_eq!(set.len(), 1);
    assert_eq!(a.resolve_count(), 0);
    assert_eq!(b.resolve_count(), 0);
    assert_eq!(other.resolve_count(), 0);
}

#[test]
fn equal_pointers_after_resolution() {
    let ws = workspace();
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let a = SmartPointer::new(&ws, &child(&ws, file, &[0, 1]));
    let b = SmartPointer::new(&ws, &child(&ws, file, &[0, 1]));
    ws.edit(file, TextEdit::insert(0, " ")).unwrap();
    ws.commit(file).unwrap();

    let resolved_a = a.element(&ws).unwrap();
    let resolved_b = b.element(&ws).unwrap();
    assert!(Arc::ptr_eq(&resolved_a, &resolved_b));
    assert_eq!(a, b);
}

#[test]
fn file_and_directory_pointers() {
    let ws = workspace();
    let dir = ws.add_directory("src").unwrap();
    let file = ws.add_file("src/Main.sx", "sx", MAIN).unwrap();
    let dir_pointer = SmartPointer::new(&ws, &ws.find_directory(dir).unwrap());
    let file_pointer = SmartPointer::new(&ws, &ws.find_file(file).unwrap());
    assert_eq!(dir_pointer.strategy(), ElementInfoKind::Directory);
    assert_eq!(file_pointer.strategy(), ElementInfoKind::File);
    assert_eq!(dir_pointer.range(), None);
    assert_eq!(file_pointer.range(), None);
    assert_eq!(dir_pointer.containing_file(&ws), None);

    ws.edit(file, TextEdit::insert(0, "(header)")).unwrap();
    ws.commit(file).unwrap();
    let root = file_pointer.element(&ws).unwrap();
    assert!(root.is_file());
    assert_eq!(root.children().len(), 2);
    assert!(dir_pointer.element(&ws).unwrap().is_directory());
}

#[test]
fn multi_root_pointer_resolves_in_its_root() {
    let ws = workspace();
    let file = ws
        .add_multi_root_file("page.sx", &["sx", "query"], "(select a (from b))")
        .unwrap();
    let view = ws.view(file).unwrap();
    let from = view.root(ws.intern("query")).unwrap().children()[0].children()[0].clone();
    let pointer = SmartPointer::new(&ws, &from);
    assert_eq!(pointer.strategy(), ElementInfoKind::MultiRootRange);

    ws.edit(file, TextEdit::insert(0, "  ")).unwrap();
    ws.commit(file).unwrap();
    let restored = pointer.element(&ws).unwrap();
    assert_eq!(restored.language(), ws.intern("query"));
    assert_eq!(restored.name(), Some("b"));
}

#[test]
fn injected_pointer_follows_host_edits() {
    let ws = workspace();
    let file = ws
        .add_file("page.sx", "sx", "(page (script (call f) (call g)))")
        .unwrap();
    ws.inject(file, "script", "query").unwrap();
    let host = child(&ws, file, &[0, 0]);
    let injected = ws.injected_root(&host).unwrap();
    let call_g = injected.children()[0].children()[1].clone();
    let pointer = SmartPointer::new(&ws, &call_g);
    assert_eq!(pointer.strategy(), ElementInfoKind::Injected);
    assert_eq!(pointer.containing_file(&ws), call_g.virtual_file());

    ws.edit(file, TextEdit::insert(6, "(title t) ")).unwrap();
    ws.commit(file).unwrap();
    let restored = pointer.element(&ws).unwrap();
    assert_eq!(restored.name(), Some("g"));
    assert!(!call_g.is_valid());
    assert!(ws.is_injected(restored.virtual_file().unwrap()));
    assert_ne!(restored.virtual_file(), call_g.virtual_file());
}

#[test]
fn stub_pointer_survives_reload() {
    let ws = workspace();
    let stubs = || {
        vec![StubNode::new("class")
            .named("Main")
            .child(StubNode::new("method").named("run"))]
    };
    let file = ws.add_compiled_file("Main.class", "jvm", stubs()).unwrap();
    let pointer = SmartPointer::new(&ws, &child(&ws, file, &[0, 0]));
    assert_eq!(pointer.strategy(), ElementInfoKind::Stub);

    ws.reload_compiled_file(file, stubs()).unwrap();
    assert_eq!(pointer.element(&ws).unwrap().name(), Some("run"));

    ws.reload_compiled_file(file, vec![StubNode::new("class")]).unwrap();
    assert!(pointer.element(&ws).is_none());
}

#[test]
fn hard_pointers_hold_light_elements() {
    let ws = workspace();
    let light = ws.create_light_element("method", Some("synthetic"));
    let pointer = SmartPointer::new(&ws, &light);
    drop(light);
    assert_eq!(pointer.strategy(), ElementInfoKind::Hard);
    assert_eq!(pointer.element(&ws).unwrap().name(), Some("synthetic"));
    assert_eq!(pointer.containing_file(&ws), None);
}

/// Anchors named elements by name, so they survive edits inside them.
#[derive(Debug)]
struct ByName {
    file: VirtualFileId,
    name: String,
}

impl ElementInfo for ByName {
    fn restore_element(&self, ws: &Workspace) -> Option<Arc<Element>> {
        ws.find_file(self.file)?
            .descendants()
            .find(|e| e.name() == Some(self.name.as_str()))
    }

    fn virtual_file(&self) -> Option<VirtualFileId> {
        Some(self.file)
    }

    fn element_hash(&self) -> u64 {
        self.name.len() as u64
    }

    fn points_to_same(&self, other: &dyn ElementInfo) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.file == self.file && o.name == self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ByNameFactory;

impl ElementInfoFactory for ByNameFactory {
    fn create_element_info(
        &self,
        _ws: &Workspace,
        element: &Arc<Element>,
    ) -> Option<Box<dyn ElementInfo>> {
        Some(Box::new(ByName {
            file: element.containing_file()?,
            name: element.name()?.to_string(),
        }))
    }
}

#[test]
fn custom_factory_wins_over_range() {
    let ws = workspace();
    let manager = SmartPointerManager::new();
    manager.register_factory(ByNameFactory);
    let file = ws.add_file("Main.sx", "sx", MAIN).unwrap();
    let run = manager.create_pointer(&ws, &child(&ws, file, &[0, 0]));
    assert_eq!(run.strategy(), ElementInfoKind::Custom);

    // Retyping the whole element loses its range but not its name.
    let edit = TextEdit::replace(TextRange::new(12, 24), "(method run) (field x)");
    ws.edit(file, edit).unwrap();
    ws.commit(file).unwrap();
    assert_eq!(run.element(&ws).unwrap().name(), Some("run"));
}
