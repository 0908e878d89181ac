//! Range-based lookups inside element trees.

use std::sync::Arc;

use tether_text::TextRange;

use crate::element::{Element, ElementType};

/// Finds the innermost element under `root` whose range is exactly `range`
/// and whose type is `element_type`.
///
/// Descends through the children containing `range`; when several nested
/// elements share the range, the deepest one of the right type wins.
pub fn find_element(
    root: &Arc<Element>,
    range: TextRange,
    element_type: ElementType,
) -> Option<Arc<Element>> {
    let mut found = None;
    let mut current = Arc::clone(root);
    loop {
        if current.range() == Some(range) && current.element_type() == element_type {
            found = Some(Arc::clone(&current));
        }
        let next = current
            .children()
            .iter()
            .find(|child| child.range().is_some_and(|r| r.contains_range(range)))
            .cloned();
        match next {
            Some(child) => current = child,
            None => return found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementOrigin, ElementSeed};
    use tether_common::Ident;

    fn node(id: u64, kind: u32, range: (u32, u32), children: Vec<Arc<Element>>) -> Arc<Element> {
        ElementSeed {
            element_type: ElementType::Node(Ident::from_raw(kind)),
            language: Ident::from_raw(0),
            virtual_file: None,
            range: Some(TextRange::new(range.0, range.1)),
            name: None,
            physical: true,
            origin: ElementOrigin::Source,
        }
        .build(ElementId::from_raw(id), children)
    }

    #[test]
    fn finds_deepest_matching_type() {
        // wrapper(kind 1) and inner(kind 1) share a range; inner is deeper.
        let inner = node(3, 1, (5, 10), vec![]);
        let wrapper = node(2, 1, (5, 10), vec![Arc::clone(&inner)]);
        let root = node(1, 9, (0, 20), vec![wrapper]);
        let kind = ElementType::Node(Ident::from_raw(1));
        let found = find_element(&root, TextRange::new(5, 10), kind);
        assert_eq!(found.unwrap().id(), inner.id());
    }

    #[test]
    fn type_mismatch_is_none() {
        let root = node(1, 9, (0, 20), vec![node(2, 1, (5, 10), vec![])]);
        let other = ElementType::Node(Ident::from_raw(7));
        assert!(find_element(&root, TextRange::new(5, 10), other).is_none());
        let kind = ElementType::Node(Ident::from_raw(1));
        let inexact = find_element(&root, TextRange::new(5, 9), kind);
        assert!(inexact.is_none());
    }
}
