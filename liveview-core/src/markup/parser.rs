//! Markup parser that builds document trees.
//!
//! Tokenizing is done by quick-xml's streaming reader in HTML attribute
//! mode, which accepts bare and unquoted attributes. Names, namespace
//! prefixes and tree shape are checked here.

use quick_xml::errors::{Error as XmlError, IllFormedError, SyntaxError};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::document::Document;
use crate::error::ParseError;
use crate::node::{Element, Name, NameError, Node, NodeRef};

/// Parses markup from a string into a new document.
///
/// All top-level nodes become children of the synthetic root.
pub fn parse_str(markup: &str) -> Result<Document, ParseError> {
    MarkupParser::new(markup).parse()
}

struct MarkupParser<'a> {
    reader: Reader<&'a [u8]>,
    doc: Document,
    /// Open elements with their tag as written, innermost last.
    open: Vec<(NodeRef, String)>,
    /// Text accumulated since the last tag.
    text: String,
    /// Whether the last tag closed a sibling element rather than opening
    /// the parent.
    after_element: bool,
}

impl<'a> MarkupParser<'a> {
    fn new(markup: &'a str) -> Self {
        let mut reader = Reader::from_str(markup);
        // Whitespace is normalized per text run in `flush_text`
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;
        reader.config_mut().check_end_names = true;
        MarkupParser {
            reader,
            doc: Document::empty(),
            open: Vec::new(),
            text: String::new(),
            after_element: false,
        }
    }

    fn parse(mut self) -> Result<Document, ParseError> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => return Err(self.xml_error(err)),
            };
            match event {
                Event::Start(e) => {
                    self.flush_text(true);
                    let (element, tag) = self.element(&e)?;
                    let parent = self.parent();
                    let node = self.doc.append(parent, Node::Element(element));
                    self.open.push((node, tag));
                    self.after_element = false;
                }
                Event::End(_) => {
                    self.flush_text(false);
                    self.open.pop();
                    self.after_element = true;
                }
                Event::Empty(e) => {
                    self.flush_text(true);
                    let (element, _) = self.element(&e)?;
                    let parent = self.parent();
                    self.doc.append(parent, Node::Element(element));
                    self.after_element = true;
                }
                Event::Text(e) => {
                    let text = std::str::from_utf8(e.as_ref()).map_err(|err| self.syntax(err))?;
                    self.text.push_str(text);
                }
                Event::CData(e) => {
                    self.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                Event::GeneralRef(e) => self.reference(&e)?,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        self.flush_text(false);
        if let Some((_, tag)) = self.open.pop() {
            return Err(ParseError::UnclosedElement { tag });
        }
        Ok(self.doc)
    }

    fn parent(&self) -> NodeRef {
        self.open
            .last()
            .map(|(node, _)| *node)
            .unwrap_or_else(|| self.doc.root())
    }

    /// Builds an element from a start or empty tag.
    ///
    /// A repeated attribute overrides the earlier occurrence.
    fn element(&self, e: &BytesStart<'_>) -> Result<(Element, String), ParseError> {
        let raw = e.name();
        let tag = std::str::from_utf8(raw.as_ref()).map_err(|err| self.syntax(err))?;
        let mut element = Element::new(self.name(tag)?);

        let mut attributes = e.html_attributes();
        attributes.with_checks(false);
        for attr in attributes {
            let attr = attr.map_err(|err| ParseError::InvalidAttribute {
                position: self.reader.buffer_position(),
                message: err.to_string(),
            })?;
            let key = std::str::from_utf8(attr.key.as_ref()).map_err(|err| self.syntax(err))?;
            let name = self.name(key)?;
            let raw = std::str::from_utf8(&attr.value).map_err(|err| self.syntax(err))?;
            let value = unescape(raw).map_err(|message| ParseError::InvalidAttribute {
                position: self.reader.buffer_position(),
                message,
            })?;
            element.set_attribute(name, value);
        }

        Ok((element, tag.to_string()))
    }

    fn name(&self, qualified: &str) -> Result<Name, ParseError> {
        let position = self.reader.buffer_position();
        Name::parse_qualified(qualified).map_err(|err| match err {
            NameError::Invalid => ParseError::InvalidName {
                position,
                name: qualified.to_string(),
            },
            NameError::InvalidNamespace => ParseError::InvalidNamespace {
                position,
                name: qualified.to_string(),
            },
        })
    }

    /// Resolves `&name;` and `&#N;` into the current text run.
    fn reference(&mut self, e: &BytesRef<'_>) -> Result<(), ParseError> {
        let name = std::str::from_utf8(e.as_ref()).map_err(|err| self.syntax(err))?;
        resolve_reference(name, &mut self.text).map_err(|message| self.syntax(message))
    }

    /// Turns the pending text run into a leaf.
    ///
    /// `before_element` tells whether the run ends at a sibling element
    /// rather than at the parent's closing tag.
    fn flush_text(&mut self, before_element: bool) {
        if self.text.is_empty() {
            return;
        }
        let normalized = normalize_whitespace(&self.text, self.after_element, before_element);
        self.text.clear();
        if let Some(text) = normalized {
            let parent = self.parent();
            self.doc.append(parent, Node::Leaf(text));
        }
    }

    fn syntax(&self, err: impl std::fmt::Display) -> ParseError {
        ParseError::Syntax {
            position: self.reader.buffer_position(),
            message: err.to_string(),
        }
    }

    fn xml_error(&self, err: XmlError) -> ParseError {
        let position = self.reader.error_position();
        match err {
            XmlError::Syntax(SyntaxError::UnclosedTag) => ParseError::UnterminatedTag { position },
            XmlError::IllFormed(IllFormedError::MismatchedEndTag { expected, found }) => {
                ParseError::MismatchedClose {
                    position,
                    expected,
                    found,
                }
            }
            XmlError::IllFormed(IllFormedError::UnmatchedEndTag(tag)) => {
                ParseError::UnexpectedClose { position, tag }
            }
            other => ParseError::Syntax {
                position,
                message: other.to_string(),
            },
        }
    }
}

fn predefined_entity(name: &str) -> Option<&'static str> {
    match name {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        _ => None,
    }
}

/// Appends the expansion of the reference body `name` (between `&` and
/// `;`) to `out`. Unknown named entities are kept literally.
fn resolve_reference(name: &str, out: &mut String) -> Result<(), String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => number.parse::<u32>().ok(),
        };
        let c = code
            .and_then(char::from_u32)
            .ok_or_else(|| format!("invalid character reference &{};", name))?;
        out.push(c);
        return Ok(());
    }
    match predefined_entity(name) {
        Some(resolved) => out.push_str(resolved),
        None => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
    }
    Ok(())
}

/// Resolves references in an attribute value the same way as in text.
///
/// An `&` without a closing `;` is kept as is.
fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let body = &rest[start + 1..];
        match body.find(';') {
            Some(end) => {
                resolve_reference(&body[..end], &mut out)?;
                rest = &body[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Normalizes one text run; `None` if it is whitespace only.
///
/// ASCII whitespace runs collapse to one space. Leading and trailing
/// whitespace survives as a single space only on a side that touches a
/// sibling element (`after_element`, `before_element`); next to the
/// parent's own tags it is dropped.
fn normalize_whitespace(text: &str, after_element: bool, before_element: bool) -> Option<String> {
    let words: Vec<&str> = text.split_ascii_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    if after_element && text.starts_with(|c: char| c.is_ascii_whitespace()) {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if before_element && text.ends_with(|c: char| c.is_ascii_whitespace()) {
        out.push(' ');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(doc: &Document, path: &[usize]) -> Element {
        let node = doc.node_at(path).unwrap();
        doc.get(node).as_element().unwrap().clone()
    }

    #[test]
    fn test_parse_simple_markup() {
        let doc = parse_str("<VStack><Text>hello</Text></VStack>").unwrap();

        assert_eq!(doc.children(doc.root()).len(), 1);
        assert_eq!(element(&doc, &[0]).tag(), "VStack");
        assert_eq!(element(&doc, &[0, 0]).tag(), "Text");
        let leaf = doc.node_at(&[0, 0, 0]).unwrap();
        assert_eq!(doc.get(leaf).as_leaf(), Some("hello"));
    }

    #[test]
    fn test_parse_attributes() {
        let doc =
            parse_str(r#"<LiveForm id="login" phx-submit="login" ios:hidden modifiers=""/>"#)
                .unwrap();
        let form = element(&doc, &[0]);
        let attrs: Vec<_> = form
            .attributes()
            .iter()
            .map(|a| (a.namespace(), a.name(), a.value()))
            .collect();
        assert_eq!(
            attrs,
            [
                ("", "id", "login"),
                ("", "phx-submit", "login"),
                ("ios", "hidden", ""),
                ("", "modifiers", ""),
            ]
        );
    }

    #[test]
    fn test_duplicate_attribute_overrides() {
        let doc = parse_str(r#"<Text id="a" class="x" id="b"/>"#).unwrap();
        let text = element(&doc, &[0]);
        assert_eq!(text.attributes().len(), 2);
        assert_eq!(text.attribute(&Name::new("id")).unwrap().value(), "b");
        assert_eq!(text.attributes()[0].name(), "id");
    }

    #[test]
    fn test_namespaced_tag() {
        let doc = parse_str("<ios:Image/>").unwrap();
        let image = element(&doc, &[0]);
        assert_eq!(image.tag(), "Image");
        assert_eq!(image.namespace(), "ios");
    }

    #[test]
    fn test_multiple_top_level_nodes() {
        let doc = parse_str("<A/> between <B></B>").unwrap();
        let root = doc.children(doc.root());
        assert_eq!(root.len(), 3);
        assert_eq!(doc.get(root[1]).as_leaf(), Some(" between "));
    }

    #[test]
    fn test_whitespace_normalization() {
        let doc = parse_str("<Text>\n    hello \t  world\n  </Text>\n<Spacer/>\n").unwrap();
        let leaf = doc.node_at(&[0, 0]).unwrap();
        assert_eq!(doc.get(leaf).as_leaf(), Some("hello world"));
        // Whitespace-only runs produce no leaves.
        assert_eq!(doc.children(doc.root()).len(), 2);
    }

    #[test]
    fn test_inline_mixed_content_keeps_spaces() {
        let doc = parse_str("<Text>Hello <Bold>World</Bold> again</Text>").unwrap();
        let leaf = |path: &[usize]| doc.get(doc.node_at(path).unwrap()).as_leaf().map(str::to_string);
        assert_eq!(leaf(&[0, 0]).as_deref(), Some("Hello "));
        assert_eq!(leaf(&[0, 1, 0]).as_deref(), Some("World"));
        assert_eq!(leaf(&[0, 2]).as_deref(), Some(" again"));
        assert_eq!(doc.to_string(), "<Text>Hello <Bold>World</Bold> again</Text>");

        // Runs next to the parent's own tags are still trimmed.
        let doc = parse_str("<Text>\n  Hello\n  <Bold> World </Bold>\n</Text>").unwrap();
        assert_eq!(doc.to_string(), "<Text>Hello <Bold>World</Bold></Text>");
    }

    #[test]
    fn test_unknown_entity_in_attribute_kept() {
        let doc = parse_str(r#"<Text a="x&nbsp;y &amp; &#x41;" b="AT&T">x&nbsp;y</Text>"#).unwrap();
        let text = element(&doc, &[0]);
        assert_eq!(text.attributes()[0].value(), "x&nbsp;y & A");
        assert_eq!(text.attributes()[1].value(), "AT&T");
        let leaf = doc.node_at(&[0, 0]).unwrap();
        assert_eq!(doc.get(leaf).as_leaf(), Some("x&nbsp;y"));
    }

    #[test]
    fn test_invalid_character_reference_in_attribute() {
        let err = parse_str(r#"<Text a="&#xD800;"/>"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttribute { .. }), "{err:?}");
    }

    #[test]
    fn test_entities_resolved() {
        let doc = parse_str("<Text a=\"&lt;&amp;\">x &amp; y&#160;z &nbsp;</Text>").unwrap();
        let text = element(&doc, &[0]);
        assert_eq!(text.attributes()[0].value(), "<&");
        let leaf = doc.node_at(&[0, 0]).unwrap();
        assert_eq!(doc.get(leaf).as_leaf(), Some("x & y\u{a0}z &nbsp;"));
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse_str("<VStack><Text></VStack></Text>").unwrap_err();
        assert!(
            matches!(err, ParseError::MismatchedClose { ref expected, ref found, .. }
                if expected == "Text" && found == "VStack"),
            "{err:?}"
        );
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse_str("<A/></B>").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClose { .. }), "{err:?}");
    }

    #[test]
    fn test_unterminated_tag() {
        let err = parse_str("<VStack><Text").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedTag { .. }), "{err:?}");
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse_str("<VStack><Text>hi</Text>").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnclosedElement {
                tag: "VStack".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_attribute() {
        let err = parse_str(r#"<Text id="open></Text>"#).unwrap_err();
        assert!(
            matches!(
                err,
                ParseError::InvalidAttribute { .. } | ParseError::UnterminatedTag { .. }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn test_invalid_namespace_prefix() {
        let err = parse_str(r#"<Text a:b:c="x"/>"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNamespace { .. }), "{err:?}");

        let err = parse_str("<:Text/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNamespace { .. }), "{err:?}");
    }

    #[test]
    fn test_empty_input() {
        let doc = parse_str("").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n b  ", false, false).as_deref(), Some("a b"));
        assert_eq!(normalize_whitespace("  a \n b  ", true, false).as_deref(), Some(" a b"));
        assert_eq!(normalize_whitespace("  a \n b  ", false, true).as_deref(), Some("a b "));
        assert_eq!(normalize_whitespace("a\u{a0}", true, true).as_deref(), Some("a\u{a0}"));
        assert_eq!(normalize_whitespace(" \n\t ", true, true), None);
    }

    #[test]
    fn test_parse_deep_nesting() {
        let depth = 20_000;
        let markup = format!("{}{}", "<A>".repeat(depth), "</A>".repeat(depth));
        let doc = parse_str(&markup).unwrap();
        assert_eq!(doc.len(), depth + 1);
    }
}
