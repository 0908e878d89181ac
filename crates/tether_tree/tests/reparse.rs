use std::sync::Arc;

use tether_text::{TextEdit, TextRange};
use tether_tree::{find_element, SexprParser, Workspace};

fn workspace() -> Workspace {
    let ws = Workspace::new();
    ws.register_parser("sx", SexprParser);
    ws
}

#[test]
fn stale_range_maps_to_new_tree() {
    let ws = workspace();
    let file = ws
        .add_file("Main.sx", "sx", "(class Main (method run) (method stop))")
        .unwrap();
    let root = ws.find_file(file).unwrap();
    let stop = root.children()[0].children()[1].clone();
    let stop_range = stop.range().unwrap();

    ws.edit(file, TextEdit::insert(12, "(field count) ")).unwrap();
    let current = ws.current_range(file, stop_range).unwrap();
    let fresh_root = ws.find_file(file).unwrap();
    let fresh = find_element(&fresh_root, current, stop.element_type()).unwrap();

    assert!(!stop.is_valid());
    assert_eq!(fresh.name(), Some("stop"));
    assert_eq!(ws.element_text(&fresh).unwrap().as_deref(), Some("(method stop)"));
}

#[test]
fn commit_all_reparses_dirty_files() {
    let ws = workspace();
    let a = ws.add_file("a.sx", "sx", "(a)").unwrap();
    let b = ws.add_file("b.sx", "sx", "(b)").unwrap();
    let old_b = ws.find_file(b).unwrap();

    ws.edit(a, TextEdit::replace(TextRange::new(1, 2), "aa")).unwrap();
    ws.commit_all().unwrap();

    assert!(ws.is_committed(a));
    assert!(Arc::ptr_eq(&old_b, &ws.find_file(b).unwrap()));
    assert_eq!(ws.find_file(a).unwrap().children()[0].element_type(), ws.node_type("aa"));
}

#[test]
fn compiled_files_reject_text_edits() {
    let ws = workspace();
    let file = ws
        .add_compiled_file("A.class", "jvm", vec![tether_tree::StubNode::new("class")])
        .unwrap();
    assert!(ws.edit(file, TextEdit::insert(0, "x")).is_err());
    assert!(ws.document(file).is_none());
    assert!(ws.is_committed(file));
}
