//! Markup printer for document trees.
//!
//! Output always parses back to an equivalent tree: attribute order is
//! kept, bare attributes print without a value and childless elements
//! self-close.

use crate::document::Document;
use crate::node::{Node, NodeRef};

use super::{escape_attr, escape_text};

/// How to lay out printed markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintOptions {
    /// Everything on one line, no insignificant whitespace.
    #[default]
    Minified,
    /// One node per line, indented by two spaces per level.
    Pretty,
}

impl PrintOptions {
    fn pretty(self) -> bool {
        self == PrintOptions::Pretty
    }
}

/// Prints the subtree under `node` into `out`.
///
/// Printing the root prints its children; the root itself has no markup.
/// In pretty mode the children of an element that holds text stay on one
/// line, so no whitespace is added next to a leaf.
pub fn print_node(doc: &Document, node: NodeRef, out: &mut String, options: PrintOptions) {
    Printer { doc, out, options }.run(node);
}

enum Step {
    Open {
        node: NodeRef,
        depth: usize,
        inline: bool,
    },
    Close {
        node: NodeRef,
        depth: usize,
        inline: bool,
        inline_children: bool,
    },
}

struct Printer<'a> {
    doc: &'a Document,
    out: &'a mut String,
    options: PrintOptions,
}

impl Printer<'_> {
    fn run(&mut self, node: NodeRef) {
        let mut stack = Vec::new();
        if self.doc.get(node).is_root() {
            self.push_children(&mut stack, node, 0, self.has_text(node));
        } else {
            stack.push(Step::Open {
                node,
                depth: 0,
                inline: false,
            });
        }

        while let Some(step) = stack.pop() {
            match step {
                Step::Open { node, depth, inline } => self.open(&mut stack, node, depth, inline),
                Step::Close {
                    node,
                    depth,
                    inline,
                    inline_children,
                } => {
                    if !inline_children {
                        self.indent(depth, inline);
                    }
                    if let Some(element) = self.doc.get(node).as_element() {
                        self.out.push_str("</");
                        self.out.push_str(&element.name.to_string());
                        self.out.push('>');
                    }
                    self.newline(inline);
                }
            }
        }
    }

    fn open(&mut self, stack: &mut Vec<Step>, node: NodeRef, depth: usize, inline: bool) {
        match self.doc.get(node) {
            Node::Root => {}
            Node::Leaf(text) => {
                self.indent(depth, inline);
                self.out.push_str(&escape_text(text));
                self.newline(inline);
            }
            Node::Element(element) => {
                self.indent(depth, inline);
                self.out.push('<');
                self.out.push_str(&element.name.to_string());
                for attr in element.attributes() {
                    self.out.push(' ');
                    self.out.push_str(&attr.name.to_string());
                    if !attr.is_bare() {
                        self.out.push_str("=\"");
                        self.out.push_str(&escape_attr(attr.value()));
                        self.out.push('"');
                    }
                }

                if self.doc.children(node).is_empty() {
                    self.out.push_str(" />");
                    self.newline(inline);
                    return;
                }

                self.out.push('>');
                let inline_children = inline || self.has_text(node);
                self.newline(inline_children);
                stack.push(Step::Close {
                    node,
                    depth,
                    inline,
                    inline_children,
                });
                self.push_children(stack, node, depth + 1, inline_children);
            }
        }
    }

    fn push_children(&self, stack: &mut Vec<Step>, node: NodeRef, depth: usize, inline: bool) {
        for &child in self.doc.children(node).iter().rev() {
            stack.push(Step::Open {
                node: child,
                depth,
                inline,
            });
        }
    }

    fn has_text(&self, node: NodeRef) -> bool {
        self.doc
            .children(node)
            .iter()
            .any(|&child| self.doc.get(child).is_leaf())
    }

    fn indent(&mut self, depth: usize, inline: bool) {
        if self.options.pretty() && !inline {
            self.out.push_str(&"  ".repeat(depth));
        }
    }

    fn newline(&mut self, inline: bool) {
        if self.options.pretty() && !inline {
            self.out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_str;

    #[test]
    fn test_print_minified() {
        let doc = parse_str(r#"<VStack modifiers id="a &amp; b"><Text>hi</Text><Spacer></Spacer></VStack>"#)
            .unwrap();
        assert_eq!(
            doc.print(PrintOptions::Minified),
            r#"<VStack modifiers id="a &amp; b"><Text>hi</Text><Spacer /></VStack>"#
        );
    }

    #[test]
    fn test_print_pretty() {
        let doc = parse_str("<VStack><ios:Text>hi</ios:Text><Spacer/></VStack>").unwrap();
        assert_eq!(
            doc.print(PrintOptions::Pretty),
            "<VStack>\n  <ios:Text>hi</ios:Text>\n  <Spacer />\n</VStack>\n"
        );
    }

    #[test]
    fn test_print_single_node() {
        let doc = parse_str("<A><B x=\"1\"/>text &lt;here&gt;</A>").unwrap();
        let mut out = String::new();
        print_node(&doc, doc.node_at(&[0, 1]).unwrap(), &mut out, PrintOptions::Minified);
        assert_eq!(out, "text &lt;here&gt;");
    }

    #[test]
    fn test_pretty_keeps_mixed_content_on_one_line() {
        let doc = parse_str("<VStack><Text>Hello <Bold>World</Bold> again</Text></VStack>").unwrap();
        assert_eq!(
            doc.print(PrintOptions::Pretty),
            "<VStack>\n  <Text>Hello <Bold>World</Bold> again</Text>\n</VStack>\n"
        );
    }

    #[test]
    fn test_print_deep_tree() {
        let depth = 20_000;
        let markup = format!("{}x{}", "<A>".repeat(depth), "</A>".repeat(depth));
        let doc = parse_str(&markup).unwrap();
        assert_eq!(doc.print(PrintOptions::Minified), markup);
        assert!(doc.print(PrintOptions::Pretty).starts_with("<A>\n  <A>\n"));
    }

    #[test]
    fn test_round_trip() {
        let markup = r#"<VStack modifiers=""><LiveForm id="login" phx-submit="login"><TextField name="email">Email</TextField></LiveForm></VStack>"#;
        let first = parse_str(markup).unwrap();
        let printed = first.print(PrintOptions::Pretty);
        let second = parse_str(&printed).unwrap();
        assert_eq!(second.print(PrintOptions::Minified), first.print(PrintOptions::Minified));
    }
}
