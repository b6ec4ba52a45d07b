//! Edit script generation.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::document::Document;
use crate::node::{Element, Name, Node, NodeRef};

use super::Patch;

/// Computes the patches that make `target` equal to `source`.
///
/// Nodes are paired by position. A pair of leaves or of elements with the
/// same name is updated in place; any other pair is replaced wholesale.
/// Patches come out in document order. The walk keeps its own work stack,
/// so nesting depth is bounded by memory rather than the call stack.
pub fn diff(target: &Document, source: &Document) -> Vec<Patch> {
    let mut generator = Generator {
        target,
        source,
        path: Vec::new(),
        stack: Vec::new(),
        patches: Vec::new(),
    };
    generator.expand(target.root(), source.root(), 0);
    generator.run();
    debug!(patches = generator.patches.len(), "generated edit script");
    generator.patches
}

/// Pending work, popped in document order.
enum Task {
    /// Compare the `index`th children of two matched parents at `depth`.
    Pair {
        target: NodeRef,
        source: NodeRef,
        depth: usize,
        index: usize,
    },
    /// Remove or append the children past the shorter list, once every
    /// positional pair below the parents has been handled.
    Trailing {
        target: NodeRef,
        source: NodeRef,
        depth: usize,
    },
}

struct Generator<'a> {
    target: &'a Document,
    source: &'a Document,
    /// Path of the target node being compared; only the prefix up to the
    /// current task's depth is meaningful.
    path: Vec<usize>,
    stack: Vec<Task>,
    patches: Vec<Patch>,
}

impl<'a> Generator<'a> {
    fn run(&mut self) {
        while let Some(task) = self.stack.pop() {
            match task {
                Task::Pair {
                    target,
                    source,
                    depth,
                    index,
                } => {
                    self.path.truncate(depth);
                    self.path.push(index);
                    self.node(target, source);
                }
                Task::Trailing {
                    target,
                    source,
                    depth,
                } => {
                    self.path.truncate(depth);
                    self.trailing(target, source);
                }
            }
        }
    }

    fn node(&mut self, target: NodeRef, source: NodeRef) {
        let (target_doc, source_doc): (&'a Document, &'a Document) = (self.target, self.source);
        match (target_doc.get(target), source_doc.get(source)) {
            (Node::Leaf(old), Node::Leaf(new)) => {
                if old != new {
                    self.patches.push(Patch::SetText {
                        node: target,
                        path: self.path.clone(),
                        text: new.clone(),
                    });
                }
            }
            (Node::Element(old), Node::Element(new)) if old.name == new.name => {
                self.attributes(target, old, new);
                self.expand(target, source, self.path.len());
            }
            _ => self.patches.push(Patch::Replace {
                node: target,
                path: self.path.clone(),
                with: source,
            }),
        }
    }

    /// Removals first, in target order, then additions and changes in
    /// source order. An attribute present on both sides with the same
    /// value produces nothing.
    fn attributes(&mut self, node: NodeRef, old: &Element, new: &Element) {
        let current: FxHashMap<&Name, &str> = old
            .attributes()
            .iter()
            .map(|attr| (&attr.name, attr.value()))
            .collect();
        let wanted: FxHashMap<&Name, &str> = new
            .attributes()
            .iter()
            .map(|attr| (&attr.name, attr.value()))
            .collect();

        for attr in old.attributes() {
            if !wanted.contains_key(&attr.name) {
                self.patches.push(Patch::RemoveAttribute {
                    node,
                    path: self.path.clone(),
                    name: attr.name.clone(),
                });
            }
        }
        for attr in new.attributes() {
            if current.get(&attr.name) != Some(&attr.value()) {
                self.patches.push(Patch::SetAttribute {
                    node,
                    path: self.path.clone(),
                    name: attr.name.clone(),
                    value: attr.value().to_string(),
                });
            }
        }
    }

    /// Schedules the children of two matched nodes at `depth`.
    ///
    /// Pairs are pushed last-first so the first child is handled next, and
    /// the trailing step sits below them all.
    fn expand(&mut self, target: NodeRef, source: NodeRef, depth: usize) {
        let old: &'a [NodeRef] = self.target.children(target);
        let new: &'a [NodeRef] = self.source.children(source);

        self.stack.push(Task::Trailing {
            target,
            source,
            depth,
        });
        for (index, (&old_child, &new_child)) in old.iter().zip(new).enumerate().rev() {
            self.stack.push(Task::Pair {
                target: old_child,
                source: new_child,
                depth,
                index,
            });
        }
    }

    fn trailing(&mut self, target: NodeRef, source: NodeRef) {
        let old: &'a [NodeRef] = self.target.children(target);
        let new: &'a [NodeRef] = self.source.children(source);
        let common = old.len().min(new.len());

        // Each removal shifts the next trailing child into the same slot.
        self.path.push(common);
        for &child in &old[common..] {
            self.patches.push(Patch::Remove {
                node: child,
                path: self.path.clone(),
            });
        }
        self.path.pop();

        for (index, &child) in new.iter().enumerate().skip(common) {
            self.patches.push(Patch::Append {
                parent: target,
                path: self.path.clone(),
                index,
                node: child,
            });
        }
    }
}
