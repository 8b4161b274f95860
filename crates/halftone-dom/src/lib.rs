//! Arena-based DOM tree for the Halftone renderer.
//!
//! The whole document lives in one contiguous arena; nodes refer to each
//! other through [`NodeId`] indices. Parent links are plain indices, not
//! owning references, so the parent↔child cycle that trips up ownership
//! in a pointer-based tree simply does not exist here: the arena owns
//! every node, and dropping the [`DomTree`] drops the document.
//!
//! Traversal in any direction (parent, children, siblings, ancestors,
//! document order) is O(1) per step.

/// A type-safe index into the DOM arena.
///
/// `NodeId` provides O(1) access to any node in the tree without
/// borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const DOCUMENT: Self = Self(0);
}

/// One node in the document tree.
///
/// Stores indices for parent/child/sibling relationships, enabling O(1)
/// traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub kind: NodeKind,
    /// Parent index; `None` only for the document node.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// The sibling immediately after this node, if any.
    pub next_sibling: Option<NodeId>,
    /// The sibling immediately before this node, if any.
    pub prev_sibling: Option<NodeId>,
}

/// The node variants the renderer works with.
///
/// Comments and doctypes never reach the tree; the HTML front end drops
/// them during parsing.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The synthetic root above `<html>`.
    Document,
    /// An element with a tag name and attributes.
    Element(ElementData),
    /// A run of character data.
    Text(String),
}

/// Tag name and attributes of an element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name (`div`, `p`, `img`, …).
    pub name: String,
    /// Attributes in document order.
    pub attributes: AttributeList,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attributes: AttributeList::new(),
        }
    }

    /// Look up an attribute value by (case-insensitive) name.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// The element's `id` attribute, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Whether the space-separated `class` attribute contains `class_name`.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.get_attribute("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class_name))
    }
}

/// An insertion-ordered attribute map.
///
/// Documents rarely carry more than a handful of attributes per element,
/// so a linear scan over a `Vec` beats a hash map here and preserves the
/// order attributes appeared in the source.
#[derive(Debug, Clone, Default)]
pub struct AttributeList {
    entries: Vec<(String, String)>,
}

impl AttributeList {
    /// Create an empty attribute list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by case-insensitive name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Insert an attribute, keeping the first occurrence when the source
    /// repeats a name (HTML parsing rule for duplicate attributes).
    pub fn insert(&mut self, name: String, value: String) {
        if self.get(&name).is_none() {
            self.entries.push((name.to_ascii_lowercase(), value));
        }
    }

    /// Iterate over `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes, indexed by `NodeId`. The document node is at index 0.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
        }
    }

    /// The document root id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes in the tree (including the document node).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (never true: the document node exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a detached node and return its id.
    ///
    /// The node has no parent or siblings until [`DomTree::append_child`]
    /// links it into the tree.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Append `child` as the last child of `parent`, fixing up parent and
    /// sibling links.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        if let Some(prev) = prev_last {
            self.nodes[prev.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev);
        }
    }

    /// Parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The sibling immediately before `id`.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The sibling immediately after `id`.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Element data if `id` is an element node.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Text content if `id` is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Iterator over ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.parent(id);
            Some(id)
        })
    }

    /// Iterator over preceding siblings, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.prev_sibling(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.prev_sibling(id);
            Some(id)
        })
    }

    /// Iterator over all descendants of `id` in document order
    /// (depth-first pre-order), excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// The `<html>` element: the first element child of the document.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::DOCUMENT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// The `<body>` element: the first `body` child of the document element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.as_element(id).is_some_and(|e| e.name == "body"))
            .copied()
    }

    /// Concatenated text of all text-node descendants of `id`.
    ///
    /// Used to lift the contents of `<style>` elements out as raw CSS.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.descendants(id) {
            if let Some(text) = self.as_text(child) {
                out.push_str(text);
            }
        }
        out
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
