//! Stub trees describing the structure of compiled files.

/// One node of a compiled file's structure.
///
/// Indexed nodes are addressable by their index path from the file root, which
/// stays stable across reloads as long as the compiled structure does. Opaque
/// nodes (and everything below them) get no stub path.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StubNode {
    /// Node kind, for example `class` or `method`.
    pub kind: String,
    /// Declared name, if any.
    pub name: Option<String>,
    /// Whether the node is part of the stub index.
    pub indexed: bool,
    /// Child nodes.
    pub children: Vec<StubNode>,
}

impl StubNode {
    /// Creates an indexed node without name or children.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            indexed: true,
            children: Vec::new(),
        }
    }

    /// Sets the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a child.
    pub fn child(mut self, child: StubNode) -> Self {
        self.children.push(child);
        self
    }

    /// Removes the node from the stub index.
    pub fn opaque(mut self) -> Self {
        self.indexed = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods() {
        let stub = StubNode::new("class")
            .named("Main")
            .child(StubNode::new("method").named("run"))
            .child(StubNode::new("code").opaque());
        assert_eq!(stub.name.as_deref(), Some("Main"));
        assert_eq!(stub.children.len(), 2);
        assert!(stub.indexed);
        assert!(!stub.children[1].indexed);
    }
}
