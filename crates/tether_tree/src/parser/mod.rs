//! Parser plug-in interface and the builder parsers report nodes to.

mod sexpr;

pub use sexpr::SexprParser;

use tether_text::TextRange;

/// Turns the text of a file into a tree of nodes.
///
/// Parsers are registered per language on the [`Workspace`](crate::Workspace)
/// and run on every commit of a changed document. They report nodes through
/// the [`TreeBuilder`] and never see elements directly.
pub trait Parser: Send + Sync {
    /// Parses `text`, reporting every node to `builder`.
    fn parse(&self, text: &str, builder: &mut TreeBuilder);
}

/// A parsed node before it becomes an [`Element`](crate::Element).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NodeSpec {
    /// Node kind, for example `class` or `method`.
    pub kind: String,
    /// Declared name, if any.
    pub name: Option<String>,
    /// Range in the parsed text.
    pub range: TextRange,
    /// Child nodes in source order.
    pub children: Vec<NodeSpec>,
}

struct OpenNode {
    kind: String,
    name: Option<String>,
    start: u32,
    children: Vec<NodeSpec>,
}

/// Collects the nodes reported by a [`Parser`].
///
/// Nodes are opened and closed in a strictly nested fashion. Nodes still open
/// when the parser returns are closed at the end of the text.
pub struct TreeBuilder {
    text_len: u32,
    open: Vec<OpenNode>,
    top_level: Vec<NodeSpec>,
}

impl TreeBuilder {
    /// Creates a builder for a text of `text_len` bytes.
    pub fn new(text_len: u32) -> Self {
        Self {
            text_len,
            open: Vec::new(),
            top_level: Vec::new(),
        }
    }

    /// Opens a node of `kind` starting at `start`.
    pub fn start_node(&mut self, kind: &str, start: u32) {
        self.open.push(OpenNode {
            kind: kind.to_string(),
            name: None,
            start: start.min(self.text_len),
            children: Vec::new(),
        });
    }

    /// Names the innermost open node. Ignored when no node is open.
    pub fn set_name(&mut self, name: &str) {
        if let Some(node) = self.open.last_mut() {
            node.name = Some(name.to_string());
        }
    }

    /// Closes the innermost open node at `end`. Ignored when no node is open.
    pub fn finish_node(&mut self, end: u32) {
        if let Some(node) = self.open.pop() {
            let end = end.min(self.text_len);
            self.attach(NodeSpec {
                kind: node.kind,
                name: node.name,
                range: TextRange::new(node.start, end),
                children: node.children,
            });
        }
    }

    /// Reports a node without children.
    pub fn leaf(&mut self, kind: &str, range: TextRange) {
        self.attach(NodeSpec {
            kind: kind.to_string(),
            name: None,
            range,
            children: Vec::new(),
        });
    }

    /// Number of nodes currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn attach(&mut self, spec: NodeSpec) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(spec),
            None => self.top_level.push(spec),
        }
    }

    /// Closes any node left open and returns the top-level nodes.
    pub fn finish(mut self) -> Vec<NodeSpec> {
        while !self.open.is_empty() {
            self.finish_node(self.text_len);
        }
        self.top_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_nodes() {
        let mut b = TreeBuilder::new(20);
        b.start_node("class", 0);
        b.set_name("A");
        b.start_node("method", 5);
        b.finish_node(10);
        b.finish_node(20);
        let nodes = b.finish();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name.as_deref(), Some("A"));
        assert_eq!(nodes[0].children[0].range, TextRange::new(5, 10));
    }

    #[test]
    fn unclosed_nodes_end_at_text_end() {
        let mut b = TreeBuilder::new(12);
        b.start_node("block", 3);
        b.leaf("word", TextRange::new(4, 6));
        let nodes = b.finish();
        assert_eq!(nodes[0].range, TextRange::new(3, 12));
        assert_eq!(nodes[0].children.len(), 1);
    }

    #[test]
    fn stray_finish_ignored() {
        let mut b = TreeBuilder::new(4);
        b.finish_node(2);
        b.set_name("x");
        assert!(b.finish().is_empty());
    }
}
