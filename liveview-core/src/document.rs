//! The document arena.
//!
//! A [`Document`] owns every node of one tree. Nodes are stored in a flat
//! arena and refer to each other through [`NodeRef`] handles; the root
//! always occupies the first slot. Released slots are recycled.

use std::fmt;

use tracing::debug;

use crate::error::ParseError;
use crate::fragment::Fragment;
use crate::markup::{self, PrintOptions};
use crate::node::{Node, NodeRef};

/// A slot in the arena.
#[derive(Debug, Clone)]
struct NodeData {
    node: Node,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
}

/// A markup document: exactly one [`Node::Root`] and everything below it.
///
/// A document is exclusively owned and has no interior mutability; move it
/// between threads freely, but mutate it from one place at a time.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<NodeData>>,
    free: Vec<NodeRef>,
    /// Fragment the current tree was last rendered from.
    pub(crate) fragment: Option<Fragment>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// Creates a document holding only the root.
    pub fn empty() -> Self {
        Document {
            nodes: vec![Some(NodeData {
                node: Node::Root,
                parent: None,
                children: Vec::new(),
            })],
            free: Vec::new(),
            fragment: None,
        }
    }

    /// Parses markup into a new document.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let doc = markup::parse_str(markup)?;
        debug!(nodes = doc.len(), "parsed document");
        Ok(doc)
    }

    /// Returns the root handle.
    pub fn root(&self) -> NodeRef {
        NodeRef::ROOT
    }

    /// Returns the node behind `node`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was released or never belonged to this document.
    pub fn get(&self, node: NodeRef) -> &Node {
        &self.data(node).node
    }

    /// Returns the node behind `node`, or `None` for a dead handle.
    pub fn try_get(&self, node: NodeRef) -> Option<&Node> {
        self.slot(node).map(|data| &data.node)
    }

    /// Returns a mutable reference to the node behind `node`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was released or never belonged to this document.
    pub fn get_mut(&mut self, node: NodeRef) -> &mut Node {
        &mut self.data_mut(node).node
    }

    /// Returns the children of `node` in order.
    ///
    /// # Panics
    ///
    /// Panics if the handle was released or never belonged to this document.
    pub fn children(&self, node: NodeRef) -> &[NodeRef] {
        &self.data(node).children
    }

    /// Returns the parent of `node`, `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if the handle was released or never belonged to this document.
    pub fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.data(node).parent
    }

    /// Returns the position of `node` among its siblings.
    pub fn child_index(&self, node: NodeRef) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    /// Returns the child-index path from the root to `node`.
    ///
    /// The root's path is empty.
    pub fn path(&self, node: NodeRef) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(index) = self.child_index(current) {
            path.push(index);
            current = match self.parent(current) {
                Some(parent) => parent,
                None => break,
            };
        }
        path.reverse();
        path
    }

    /// Resolves a child-index path from the root.
    pub fn node_at(&self, path: &[usize]) -> Option<NodeRef> {
        path.iter().try_fold(self.root(), |node, &index| {
            self.slot(node)?.children.get(index).copied()
        })
    }

    /// Returns the number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Returns true if the root has no children.
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    /// Iterates the subtree under `node` in pre-order, `node` first.
    pub fn descendants(&self, node: NodeRef) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![node],
        }
    }

    /// Returns the fragment template the tree was last rendered from.
    ///
    /// Set by fragment merges; a document merge copies the source's.
    pub fn fragment(&self) -> Option<&Fragment> {
        self.fragment.as_ref()
    }

    /// Serializes the whole document.
    pub fn print(&self, options: PrintOptions) -> String {
        let mut out = String::new();
        markup::print_node(self, self.root(), &mut out, options);
        out
    }

    /// Serializes the subtree under `node` into `out`.
    pub fn print_node(&self, node: NodeRef, out: &mut String, options: PrintOptions) {
        markup::print_node(self, node, out, options);
    }

    /// Appends a new node under `parent` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a root or `parent` is a leaf.
    pub fn append(&mut self, parent: NodeRef, node: Node) -> NodeRef {
        let index = self.children(parent).len();
        self.insert(parent, index, node)
    }

    /// Inserts a new node as the `index`th child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a root, `parent` is a leaf, `index` is past the
    /// end of the child list, or the arena already holds `u32::MAX` nodes.
    pub fn insert(&mut self, parent: NodeRef, index: usize, node: Node) -> NodeRef {
        assert!(!node.is_root(), "a document has exactly one root");
        assert!(!self.get(parent).is_leaf(), "leaves cannot have children");
        let handle = self.alloc(NodeData {
            node,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.data_mut(parent).children.insert(index, handle);
        handle
    }

    /// Detaches `node` from its parent and releases its whole subtree.
    ///
    /// # Panics
    ///
    /// Panics when asked to remove the root.
    pub fn remove(&mut self, node: NodeRef) {
        let parent = self.parent(node).expect("the root cannot be removed");
        self.data_mut(parent).children.retain(|&c| c != node);
        self.release(node);
    }

    /// Copies the subtree under `node` in `source` into this document as
    /// the `index`th child of `parent`. Returns the handle of the copy.
    pub fn insert_subtree(
        &mut self,
        parent: NodeRef,
        index: usize,
        source: &Document,
        node: NodeRef,
    ) -> NodeRef {
        let copy = self.insert(parent, index, source.get(node).clone());
        let mut stack = vec![(node, copy)];
        while let Some((from, to)) = stack.pop() {
            for &child in source.children(from) {
                let child_copy = self.append(to, source.get(child).clone());
                stack.push((child, child_copy));
            }
        }
        copy
    }

    /// Swaps the subtree at `node` for a copy of `source`'s subtree under
    /// `with`, keeping its position. Returns the handle of the copy.
    ///
    /// # Panics
    ///
    /// Panics when asked to replace the root.
    pub fn replace_subtree(&mut self, node: NodeRef, source: &Document, with: NodeRef) -> NodeRef {
        let parent = self.parent(node).expect("the root cannot be replaced");
        let index = self
            .child_index(node)
            .expect("a non-root node is listed by its parent");
        self.remove(node);
        self.insert_subtree(parent, index, source, with)
    }

    fn alloc(&mut self, data: NodeData) -> NodeRef {
        match self.free.pop() {
            Some(handle) => {
                self.nodes[handle.index()] = Some(data);
                handle
            }
            None => {
                self.nodes.push(Some(data));
                NodeRef::new(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, node: NodeRef) {
        let mut stack = vec![node];
        while let Some(handle) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(handle.index()).and_then(Option::take) {
                stack.extend(data.children);
                self.free.push(handle);
            }
        }
    }

    fn slot(&self, node: NodeRef) -> Option<&NodeData> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    fn data(&self, node: NodeRef) -> &NodeData {
        match self.slot(node) {
            Some(data) => data,
            None => panic!("use of released node handle {}", node),
        }
    }

    fn data_mut(&mut self, node: NodeRef) -> &mut NodeData {
        match self.nodes.get_mut(node.index()).and_then(Option::as_mut) {
            Some(data) => data,
            None => panic!("use of released node handle {}", node),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(PrintOptions::Minified))
    }
}

/// Pre-order iterator over a subtree. See [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeRef>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}
