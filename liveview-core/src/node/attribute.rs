//! Element attributes.

use std::fmt;

use super::Name;

/// An attribute attached to an element.
///
/// An empty value stands for a bare, boolean-style attribute such as
/// `<VStack modifiers>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Name,
    pub value: String,
}

impl Attribute {
    pub fn new(name: Name, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }

    /// Local part of the attribute name.
    pub fn name(&self) -> &str {
        &self.name.name
    }

    /// Namespace of the attribute, `""` for the default namespace.
    pub fn namespace(&self) -> &str {
        self.name.namespace()
    }

    /// Attribute value, `""` when the attribute was written without one.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true for a bare attribute.
    pub fn is_bare(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}=\"{}\"", self.name, crate::markup::escape_attr(&self.value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let attr = Attribute::new(Name::with_namespace("phx", "click"), "go");
        assert_eq!(attr.name(), "click");
        assert_eq!(attr.namespace(), "phx");
        assert_eq!(attr.value(), "go");
        assert!(!attr.is_bare());
    }

    #[test]
    fn test_display() {
        let bare = Attribute::new(Name::new("modifiers"), "");
        assert_eq!(bare.to_string(), "modifiers");

        let quoted = Attribute::new(Name::new("title"), "a \"b\" & c");
        assert_eq!(quoted.to_string(), "title=\"a &quot;b&quot; &amp; c\"");
    }
}
