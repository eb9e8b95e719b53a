//! Building arena snapshots from parsed HTML.
//!
//! `scraper`'s parse tree holds non-`Send` tendrils, so it never crosses an
//! await point: parsing flattens the tree into a [`DomSnapshot`] immediately
//! and only the snapshot travels on the bus.

use lantern_core::{DomSnapshot, DomSnapshotBuilder, NodeId};
use scraper::{Html, Node};

/// Parse HTML source into an arena snapshot for the given resource URL.
#[must_use]
pub fn build_snapshot(resource: &str, source: &str) -> DomSnapshot {
    let document = Html::parse_document(source);
    let mut builder = DomSnapshotBuilder::new();
    let root = builder.root();

    for child in document.tree.root().children() {
        push_subtree(&mut builder, root, child);
    }

    builder.finish(resource)
}

fn push_subtree(
    builder: &mut DomSnapshotBuilder,
    parent: NodeId,
    node: ego_tree::NodeRef<'_, Node>,
) {
    let id = match node.value() {
        Node::Element(element) => {
            let attributes = element
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            Some(builder.push_element(parent, element.name(), attributes))
        }
        Node::Text(text) => {
            Some(builder.push_text(parent, text.to_string()))
        }
        Node::Comment(comment) => {
            Some(builder.push_comment(parent, comment.to_string()))
        }
        // Doctype, processing instructions, and fragment markers carry
        // nothing hints look at
        _ => None,
    };

    let parent_for_children = id.unwrap_or(parent);
    for child in node.children() {
        push_subtree(builder, parent_for_children, child);
    }
}
