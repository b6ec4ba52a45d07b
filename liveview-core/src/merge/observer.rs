//! The change observer contract.

use crate::document::Document;
use crate::node::{Name, NodeRef};

/// Receives every edit a merge makes, in document order.
///
/// Each call happens right after the edit it describes and before the next
/// edit is made. Paths are child-index sequences from the root and are
/// valid for a tree that has seen exactly the events delivered so far, so
/// a side structure that replays the events in order stays in step with
/// the document. A removal carries the path the node had just before it
/// was detached.
///
/// Handles passed in (`node`) point into `doc` and stay valid until a later
/// edit removes or replaces that subtree.
pub trait ChangeObserver {
    /// A new subtree was inserted as child `index` of the node at `parent`.
    fn on_node_added(&mut self, doc: &Document, parent: &[usize], index: usize, node: NodeRef);

    /// The subtree at `path` was removed.
    fn on_node_removed(&mut self, path: &[usize]);

    /// The subtree at `path` was swapped for the one rooted at `node`.
    fn on_node_replaced(&mut self, doc: &Document, path: &[usize], node: NodeRef);

    /// The text of the leaf at `path` changed from `old`.
    ///
    /// The leaf keeps its handle. By default this is reported as a replace.
    fn on_text_changed(&mut self, doc: &Document, path: &[usize], node: NodeRef, old: &str) {
        let _ = old;
        self.on_node_replaced(doc, path, node);
    }

    /// An attribute of the element at `path` was added (`old` is `None`)
    /// or changed value. An attribute set to the empty string is a change,
    /// never a removal.
    fn on_attribute_changed(&mut self, path: &[usize], name: &Name, old: Option<&str>, new: &str);

    /// An attribute of the element at `path` was removed.
    fn on_attribute_removed(&mut self, path: &[usize], name: &Name);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ChangeObserver for NullObserver {
    fn on_node_added(&mut self, _: &Document, _: &[usize], _: usize, _: NodeRef) {}
    fn on_node_removed(&mut self, _: &[usize]) {}
    fn on_node_replaced(&mut self, _: &Document, _: &[usize], _: NodeRef) {}
    fn on_attribute_changed(&mut self, _: &[usize], _: &Name, _: Option<&str>, _: &str) {}
    fn on_attribute_removed(&mut self, _: &[usize], _: &Name) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts replace calls only.
    #[derive(Default)]
    struct Replacements(Vec<(Vec<usize>, Option<String>)>);

    impl ChangeObserver for Replacements {
        fn on_node_added(&mut self, _: &Document, _: &[usize], _: usize, _: NodeRef) {}
        fn on_node_removed(&mut self, _: &[usize]) {}
        fn on_node_replaced(&mut self, doc: &Document, path: &[usize], node: NodeRef) {
            let text = doc.get(node).as_leaf().map(str::to_string);
            self.0.push((path.to_vec(), text));
        }
        fn on_attribute_changed(&mut self, _: &[usize], _: &Name, _: Option<&str>, _: &str) {}
        fn on_attribute_removed(&mut self, _: &[usize], _: &Name) {}
    }

    #[test]
    fn test_text_change_defaults_to_replace() {
        let mut doc = Document::parse("<Text>before</Text>").unwrap();
        let other = Document::parse("<Text>after</Text>").unwrap();
        let mut observer = Replacements::default();
        doc.merge(&other, &mut observer);
        assert_eq!(observer.0, [(vec![0, 0], Some("after".to_string()))]);
    }

    #[test]
    fn test_null_observer() {
        let mut doc = Document::empty();
        let other = Document::parse("<VStack><Text>x</Text></VStack>").unwrap();
        doc.merge(&other, &mut NullObserver);
        assert_eq!(doc.to_string(), other.to_string());
    }
}
