//! Markup parsing and output.
//!
//! The dialect is HTML-like: paired and self-closing tags, `ns:name`
//! qualified tags and attributes, bare attributes, and free text that
//! becomes leaf nodes.
//!
//! # Whitespace
//!
//! Each run of text between two tags is normalized the same way: a run of
//! ASCII whitespace only produces no leaf, and inside a run every stretch
//! of ASCII whitespace collapses to a single space. Leading or trailing
//! whitespace is kept as one space where the run touches a sibling
//! element, so `Hello <Bold>World</Bold> again` keeps both spaces, and is
//! dropped next to the parent's own opening or closing tag. Non-ASCII
//! spaces such as U+00A0 are kept verbatim. Entity and character
//! references are resolved before normalization, in text and attribute
//! values alike; unknown named entities are kept literally.
//!
//! The pretty printer keeps the children of any element holding text on
//! one line, so printing never adds whitespace next to a leaf.

mod parser;
mod printer;

pub use parser::parse_str;
pub use printer::{print_node, PrintOptions};

/// Escapes text content.
pub(crate) fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escapes an attribute value for use inside double quotes.
pub(crate) fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_functions() {
        assert_eq!(escape_text("<a & b>"), "&lt;a &amp; b&gt;");
        assert_eq!(escape_text("\"quoted\""), "\"quoted\"");
        assert_eq!(escape_attr("\"quoted\""), "&quot;quoted&quot;");
    }
}
