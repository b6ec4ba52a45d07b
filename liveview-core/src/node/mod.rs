//! Node structures for markup tree representation.
//!
//! A document tree is made of three node variants: a single synthetic
//! [`Node::Root`], [`Node::Element`]s carrying a name and attributes, and
//! text [`Node::Leaf`]s. Nodes live in the owning [`Document`]'s arena and
//! are addressed by [`NodeRef`] handles, so parent links never form
//! ownership cycles.
//!
//! [`Document`]: crate::Document

mod attribute;

pub use attribute::Attribute;

use std::fmt;

/// Handle to a node inside a [`Document`](crate::Document) arena.
///
/// A handle is only meaningful for the document that issued it. Once the
/// node is released by a merge, the handle is dead and may later be reused
/// for an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(u32);

impl NodeRef {
    /// The root node, always the first slot of every arena.
    pub const ROOT: NodeRef = NodeRef(0);

    /// # Panics
    ///
    /// Panics if `index` does not fit a `u32`; an arena holds at most
    /// `u32::MAX` nodes.
    pub(crate) fn new(index: usize) -> Self {
        let index = u32::try_from(index).expect("document arena is limited to u32::MAX nodes");
        NodeRef(index)
    }

    /// Returns the arena index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw handle value, suitable for crossing an FFI boundary.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A possibly namespaced name, used for both tags and attributes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    /// Namespace prefix, `None` for the default namespace.
    pub namespace: Option<String>,
    /// Local part of the name.
    pub name: String,
}

/// Why a qualified name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameError {
    Invalid,
    InvalidNamespace,
}

impl Name {
    /// Creates a name in the default namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Name {
            namespace: None,
            name: name.into(),
        }
    }

    /// Creates a name in the given namespace. An empty namespace means none.
    pub fn with_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Name {
            namespace: (!namespace.is_empty()).then_some(namespace),
            name: name.into(),
        }
    }

    /// Returns the namespace, or `""` for the default namespace.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Splits `prefix:local` and validates both halves.
    pub(crate) fn parse_qualified(qualified: &str) -> Result<Self, NameError> {
        let mut parts = qualified.split(':');
        let first = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (None, _) => {
                if is_valid_local(first) {
                    Ok(Name::new(first))
                } else {
                    Err(NameError::Invalid)
                }
            }
            (Some(local), None) => {
                if !is_valid_prefix(first) {
                    Err(NameError::InvalidNamespace)
                } else if !is_valid_local(local) {
                    Err(NameError::Invalid)
                } else {
                    Ok(Name::with_namespace(first, local))
                }
            }
            (Some(_), Some(_)) => Err(NameError::InvalidNamespace),
        }
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::new(name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}:{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn is_valid_local(local: &str) -> bool {
    let mut chars = local.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || matches!(c, '_' | '@'))
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The synthetic document root. Exactly one per document, no attributes.
    Root,
    /// A named node with attributes and children.
    Element(Element),
    /// A text node. Always childless.
    Leaf(String),
}

impl Node {
    /// Creates an element node without attributes.
    pub fn element(name: impl Into<Name>) -> Self {
        Node::Element(Element::new(name.into()))
    }

    /// Creates a text node.
    pub fn leaf(text: impl Into<String>) -> Self {
        Node::Leaf(text.into())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Node::Root)
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the text, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Node::Leaf(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if a merge may update `self` in place to become `other`.
    ///
    /// Leaves always match leaves; elements match when tag and namespace
    /// agree. Anything else needs a wholesale replacement.
    pub fn same_kind(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Root, Node::Root) | (Node::Leaf(_), Node::Leaf(_)) => true,
            (Node::Element(a), Node::Element(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// An element: a name plus an ordered attribute list.
///
/// Attribute names are unique per element; setting an existing name
/// overwrites its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: Name,
    attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: Name) -> Self {
        Element {
            name,
            attributes: Vec::new(),
        }
    }

    /// Returns the tag (local part of the name).
    pub fn tag(&self) -> &str {
        &self.name.name
    }

    /// Returns the tag namespace, or `""` for none.
    pub fn namespace(&self) -> &str {
        self.name.namespace()
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name.
    pub fn attribute(&self, name: &Name) -> Option<&Attribute> {
        self.attributes.iter().find(|a| &a.name == name)
    }

    /// Sets an attribute, returning the previous value if there was one.
    pub fn set_attribute(&mut self, name: Name, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.attributes.push(Attribute::new(name, value));
                None
            }
        }
    }

    /// Removes an attribute, returning it if it was present.
    pub fn remove_attribute(&mut self, name: &Name) -> Option<Attribute> {
        let pos = self.attributes.iter().position(|a| &a.name == name)?;
        Some(self.attributes.remove(pos))
    }
}
