//! Arena-based DOM snapshot.
//!
//! Parsed HTML documents are flattened into a [`DomSnapshot`]: a flat node
//! table with parent/child relationships stored as indices. There are no
//! cyclic references; an element is addressed as a snapshot handle plus a
//! [`NodeId`], and the snapshot itself is the owner document.
//!
//! Snapshots are built in document order, so iterating the node table by
//! index is a depth-first document-order traversal.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Index of a node within its owning [`DomSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw index into the snapshot's node table.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a DOM node is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomNodeKind {
    /// The synthetic document root
    Document,
    /// An element with its tag name and attributes (names lowercased,
    /// source order preserved)
    Element {
        /// Lowercased tag name
        name: String,
        /// (lowercased name, value) pairs in source order
        attributes: Vec<(String, String)>,
    },
    /// A text node
    Text {
        /// The text content
        content: String,
    },
    /// A comment node
    Comment {
        /// The comment content
        content: String,
    },
}

/// One node in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// Node payload
    pub kind: DomNodeKind,
    /// Parent index; `None` only for the document root
    pub parent: Option<NodeId>,
    /// Child indices in document order
    pub children: Vec<NodeId>,
}

/// An immutable snapshot of one parsed HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomSnapshot {
    /// URL of the resource the snapshot was parsed from
    pub resource: String,
    nodes: Vec<DomNode>,
}

impl DomSnapshot {
    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    /// Parent of a node, `None` for the root or an unknown id.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Tag name if the node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Attribute pairs of an element, empty for non-elements.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.node(id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { attributes, .. }) => attributes.as_slice(),
            _ => &[],
        }
    }

    /// Attribute value by name (case-insensitive).
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let wanted = name.to_ascii_lowercase();
        self.attributes(id)
            .iter()
            .find(|(n, _)| *n == wanted)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text content of a node's descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if let DomNodeKind::Text { content } = &node.kind {
                out.push_str(content);
            }
            // Push in reverse so children pop in document order
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// All element ids in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            matches!(n.kind, DomNodeKind::Element { .. }).then_some(NodeId(i))
        })
    }

    /// Element ids with the given tag name (case-insensitive), in document
    /// order.
    pub fn elements_by_name<'a>(&'a self, name: &str) -> impl Iterator<Item = NodeId> + 'a {
        let wanted = name.to_ascii_lowercase();
        self.elements()
            .filter(move |id| self.tag_name(*id) == Some(wanted.as_str()))
    }

    /// Total node count, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Incremental builder, appending nodes in document order.
#[derive(Debug)]
pub struct DomSnapshotBuilder {
    nodes: Vec<DomNode>,
}

impl DomSnapshotBuilder {
    /// Start a snapshot containing only the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![DomNode {
                kind: DomNodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append an element under `parent`. Names are lowercased.
    pub fn push_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        let attributes = attributes
            .into_iter()
            .map(|(n, v)| (n.to_ascii_lowercase(), v))
            .collect();
        self.push_node(
            parent,
            DomNodeKind::Element {
                name: name.to_ascii_lowercase(),
                attributes,
            },
        )
    }

    /// Append a text node under `parent`.
    pub fn push_text(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        self.push_node(
            parent,
            DomNodeKind::Text {
                content: content.into(),
            },
        )
    }

    /// Append a comment node under `parent`.
    pub fn push_comment(&mut self, parent: NodeId, content: impl Into<String>) -> NodeId {
        self.push_node(
            parent,
            DomNodeKind::Comment {
                content: content.into(),
            },
        )
    }

    fn push_node(&mut self, parent: NodeId, kind: DomNodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DomNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    /// Finish the snapshot for the given resource URL.
    #[must_use]
    pub fn finish(self, resource: impl Into<String>) -> DomSnapshot {
        DomSnapshot {
            resource: resource.into(),
            nodes: self.nodes,
        }
    }
}

impl Default for DomSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference to one element: the owning snapshot plus the node index.
#[derive(Debug, Clone)]
pub struct DomElement {
    /// Owner document
    pub document: Arc<DomSnapshot>,
    /// Element index within the owner
    pub node: NodeId,
}

impl DomElement {
    /// Tag name, `None` if the id does not address an element.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.document.tag_name(self.node)
    }

    /// Attribute value by name (case-insensitive).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.document.attribute(self.node, name)
    }

    /// Concatenated descendant text.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.document.text_content(self.node)
    }
}
