//! Single edits and their application.

use tracing::trace;

use crate::document::Document;
use crate::merge::ChangeObserver;
use crate::node::{Name, Node, NodeRef};

/// One edit of a target document.
///
/// `node` and `parent` are handles into the target, `with` and the
/// appended `node` are handles into the source the script was computed
/// from. Each patch also carries the path of the node it edits, as it
/// will be when the patch is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Swap the subtree at `node` for a copy of the source's `with`.
    Replace {
        node: NodeRef,
        path: Vec<usize>,
        with: NodeRef,
    },
    /// Insert a copy of the source's `node` as child `index` of `parent`.
    Append {
        parent: NodeRef,
        path: Vec<usize>,
        index: usize,
        node: NodeRef,
    },
    /// Drop the subtree at `node`.
    Remove { node: NodeRef, path: Vec<usize> },
    /// Set the text of a leaf.
    SetText {
        node: NodeRef,
        path: Vec<usize>,
        text: String,
    },
    /// Add an attribute or change its value.
    SetAttribute {
        node: NodeRef,
        path: Vec<usize>,
        name: Name,
        value: String,
    },
    RemoveAttribute {
        node: NodeRef,
        path: Vec<usize>,
        name: Name,
    },
}

impl Patch {
    /// Path of the edited node; for [`Patch::Append`], of the parent.
    pub fn path(&self) -> &[usize] {
        match self {
            Patch::Replace { path, .. }
            | Patch::Append { path, .. }
            | Patch::Remove { path, .. }
            | Patch::SetText { path, .. }
            | Patch::SetAttribute { path, .. }
            | Patch::RemoveAttribute { path, .. } => path,
        }
    }

    /// Applies the edit to `doc` and reports it to `observer`.
    ///
    /// The observer runs after the edit, so added and replaced nodes are
    /// already live in `doc`. A removal is reported with the path the node
    /// had before it was detached.
    ///
    /// # Panics
    ///
    /// A patch only applies to the target and source its script was
    /// computed from, with the earlier patches of that script already
    /// applied. Panics if a handle is dead in `doc` or `source`, or if a
    /// text or attribute patch addresses a node of the wrong kind.
    pub fn apply(self, doc: &mut Document, source: &Document, observer: &mut dyn ChangeObserver) {
        match self {
            Patch::Replace { node, path, with } => {
                trace!(?path, "replace node");
                let copy = doc.replace_subtree(node, source, with);
                observer.on_node_replaced(doc, &path, copy);
            }
            Patch::Append {
                parent,
                path,
                index,
                node,
            } => {
                trace!(?path, index, "append node");
                let copy = doc.insert_subtree(parent, index, source, node);
                observer.on_node_added(doc, &path, index, copy);
            }
            Patch::Remove { node, path } => {
                trace!(?path, "remove node");
                doc.remove(node);
                observer.on_node_removed(&path);
            }
            Patch::SetText { node, path, text } => {
                let Node::Leaf(current) = doc.get_mut(node) else {
                    panic!("text patch for {} does not address a leaf", node);
                };
                trace!(?path, "set text");
                let old = std::mem::replace(current, text);
                observer.on_text_changed(doc, &path, node, &old);
            }
            Patch::SetAttribute {
                node,
                path,
                name,
                value,
            } => {
                let Some(element) = doc.get_mut(node).as_element_mut() else {
                    panic!("attribute patch for {} does not address an element", node);
                };
                trace!(?path, %name, "set attribute");
                let old = element.set_attribute(name.clone(), value.clone());
                observer.on_attribute_changed(&path, &name, old.as_deref(), &value);
            }
            Patch::RemoveAttribute { node, path, name } => {
                let Some(element) = doc.get_mut(node).as_element_mut() else {
                    panic!("attribute patch for {} does not address an element", node);
                };
                trace!(?path, %name, "remove attribute");
                if element.remove_attribute(&name).is_some() {
                    observer.on_attribute_removed(&path, &name);
                }
            }
        }
    }
}
