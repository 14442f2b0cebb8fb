//! Arena-backed document tree with stable node identity.
//!
//! Every node lives in a slot addressed by [`NodeId`]. Slots are never reused,
//! so an id captured during a traversal keeps pointing at the same node after
//! siblings are replaced or removed. Positions are derived on demand with
//! [`Document::index_in_parent`] instead of being stored.

use crate::error::ParseError;
use crate::node::{Attributes, Element, Node};
use crate::{parser, serializer};

/// Stable handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element data stored in the arena (children live in the slot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Attributes,
}

impl ElementData {
    /// Whether the tag matches `name`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.tag.eq_ignore_ascii_case(name)
    }
}

/// Kind of an arena node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only a root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse an HTML fragment into a document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the markup cannot be tokenized.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        parser::parse_fragment(html).map(Self::from_nodes)
    }

    /// Build a document whose root holds the given nodes.
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        for node in nodes {
            let id = doc.adopt(node, root);
            doc.slots[root.0].children.push(id);
        }
        doc
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.slots[id.0].kind
    }

    /// Element data, if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            NodeKind::Element(data) => Some(data),
            NodeKind::Root
            | NodeKind::Text(_)
            | NodeKind::Comment(_)
            | NodeKind::Doctype(_) => None,
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Whether the node is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.root()
    }

    /// Current index of this exact node within its parent's children.
    ///
    /// Looked up on every call, so it stays correct after earlier siblings were
    /// replaced or removed.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Ancestors of a node, from the root down to its direct parent.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            chain.push(node);
            current = self.parent(node);
        }
        chain.reverse();
        chain
    }

    /// Pre-order iterator over a subtree, starting with `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Concatenated descendant text with whitespace kept verbatim.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| match self.kind(node) {
                NodeKind::Text(value) => Some(value.as_str()),
                NodeKind::Root
                | NodeKind::Element(_)
                | NodeKind::Comment(_)
                | NodeKind::Doctype(_) => None,
            })
            .collect()
    }

    /// Whether the node is a text node holding only whitespace.
    #[must_use]
    pub fn is_whitespace_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(value) if value.trim().is_empty())
    }

    /// Copy a subtree out of the arena as a detached [`Node`].
    ///
    /// The root has no detached form; its children are wrapped in a
    /// `template` element.
    #[must_use]
    pub fn to_node(&self, id: NodeId) -> Node {
        let children = || -> Vec<Node> {
            self.children(id)
                .iter()
                .map(|&child| self.to_node(child))
                .collect()
        };
        match self.kind(id) {
            NodeKind::Root => Node::element("template").with_children(children()),
            NodeKind::Element(data) => Node::Element(Element {
                tag: data.tag.clone(),
                attrs: data.attrs.clone(),
                children: children(),
            }),
            NodeKind::Text(value) => Node::Text(value.clone()),
            NodeKind::Comment(value) => Node::Comment(value.clone()),
            NodeKind::Doctype(value) => Node::Doctype(value.clone()),
        }
    }

    /// Replace a node at its current position with a detached subtree.
    ///
    /// Returns the id of the adopted subtree, or `None` when the node has no
    /// parent (the root or an already detached node).
    pub fn replace(&mut self, id: NodeId, node: Node) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        let new_id = self.adopt(node, parent);
        self.slots[parent.0].children[index] = new_id;
        self.slots[id.0].parent = None;
        Some(new_id)
    }

    /// Detach a node; later siblings shift left to close the gap.
    ///
    /// Returns `false` when the node has no parent.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let Some(index) = self.index_in_parent(id) else {
            return false;
        };
        self.slots[parent.0].children.remove(index);
        self.slots[id.0].parent = None;
        true
    }

    /// Append a detached subtree as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.adopt(node, parent);
        self.slots[parent.0].children.push(id);
        id
    }

    /// Serialize the document's content as HTML.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(4096);
        for &child in self.children(self.root()) {
            serializer::write_node(&self.to_node(child), &mut out);
        }
        out
    }

    /// Allocate slots for a detached subtree under `parent` (not linked yet).
    fn adopt(&mut self, node: Node, parent: NodeId) -> NodeId {
        let id = NodeId(self.slots.len());
        let (kind, children) = match node {
            Node::Element(Element {
                tag,
                attrs,
                children,
            }) => (NodeKind::Element(ElementData { tag, attrs }), children),
            Node::Text(value) => (NodeKind::Text(value), Vec::new()),
            Node::Comment(value) => (NodeKind::Comment(value), Vec::new()),
            Node::Doctype(value) => (NodeKind::Doctype(value), Vec::new()),
        };
        self.slots.push(Slot {
            kind,
            parent: Some(parent),
            children: Vec::with_capacity(children.len()),
        });
        for child in children {
            let child_id = self.adopt(child, id);
            self.slots[id.0].children.push(child_id);
        }
        id
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
