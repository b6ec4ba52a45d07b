//! Merging into a live document.
//!
//! A merge brings a target document in line with a source, reusing the
//! target's nodes wherever the two trees agree and reporting every edit to
//! a [`ChangeObserver`]. The source is either a full document or a
//! fragment diff, which is resolved against the fragment the target was
//! last rendered from, rendered to markup and parsed first.
//!
//! Every merge runs in two phases. The edit script is computed (see
//! [`crate::diff`]) while nothing has changed yet; only then are the edits
//! applied one by one, each followed by its observer call. All failure
//! modes belong to the first phase, so a failed merge leaves the document
//! untouched and the observer silent.

mod event_log;
mod observer;

pub use event_log::{ChangeEvent, ChangeKind, EventLog};
pub use observer::{ChangeObserver, NullObserver};

use tracing::debug;

use crate::diff::{self, Patch};
use crate::document::Document;
use crate::error::MergeError;
use crate::fragment::{Fragment, FragmentPatch};
use crate::markup;

/// Merges `source` into `target`.
///
/// Afterwards `target` has the same content as `source` and remembers the
/// same fragment template, if any.
pub fn merge_document(target: &mut Document, source: &Document, observer: &mut dyn ChangeObserver) {
    let patches = diff::diff(target, source);
    debug!(patches = patches.len(), "merging document");
    apply(target, source, patches, observer);
    target.fragment = source.fragment.clone();
}

/// Merges a decoded fragment diff into `target`.
///
/// Absent slots keep their content from the fragment `target` was last
/// rendered from (see [`Document::fragment`]). A document that was parsed
/// or merged from plain markup has no such fragment, so its first diff
/// must carry `"s"` at every level and fill every slot; otherwise it fails
/// with [`MergeError::MissingStatics`] or [`MergeError::UnresolvedSlot`].
///
/// Fails without touching `target` when the diff does not fit the
/// retained template or renders to markup that does not parse.
pub fn merge_fragment(
    target: &mut Document,
    patch: &FragmentPatch,
    observer: &mut dyn ChangeObserver,
) -> Result<(), MergeError> {
    let fragment = Fragment::resolve(patch, target.fragment.as_ref())?;
    let rendered = fragment.render();
    let source = markup::parse_str(&rendered).map_err(|source| MergeError::Markup { source })?;

    let patches = diff::diff(target, &source);
    debug!(
        patches = patches.len(),
        markup_len = rendered.len(),
        "merging fragment"
    );
    apply(target, &source, patches, observer);
    target.fragment = Some(fragment);
    Ok(())
}

/// Decodes a fragment diff from JSON and merges it into `target`.
pub fn merge_fragment_json(
    target: &mut Document,
    json: &str,
    observer: &mut dyn ChangeObserver,
) -> crate::Result<()> {
    let patch = FragmentPatch::decode(json)?;
    merge_fragment(target, &patch, observer)?;
    Ok(())
}

fn apply(
    target: &mut Document,
    source: &Document,
    patches: Vec<Patch>,
    observer: &mut dyn ChangeObserver,
) {
    for patch in patches {
        patch.apply(target, source, observer);
    }
}

impl Document {
    /// Merges `source` into this document. See [`merge_document`].
    pub fn merge(&mut self, source: &Document, observer: &mut dyn ChangeObserver) {
        merge_document(self, source, observer);
    }

    /// Merges a decoded fragment diff. See [`merge_fragment`].
    pub fn merge_fragment(
        &mut self,
        patch: &FragmentPatch,
        observer: &mut dyn ChangeObserver,
    ) -> Result<(), MergeError> {
        merge_fragment(self, patch, observer)
    }

    /// Decodes and merges a fragment diff. See [`merge_fragment_json`].
    pub fn merge_fragment_json(
        &mut self,
        json: &str,
        observer: &mut dyn ChangeObserver,
    ) -> crate::Result<()> {
        merge_fragment_json(self, json, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ParseError};
    use crate::markup::PrintOptions;

    const INITIAL: &str = r#"{"0":"<Text>one</Text>","1":"two","s":["<VStack>","<Spacer/>","</VStack>"]}"#;

    #[test]
    fn test_merge_into_empty() {
        let source = Document::parse(r#"<VStack modifiers=""><Text id="t">hi</Text></VStack>"#).unwrap();
        let mut doc = Document::empty();
        let mut log = EventLog::new();
        doc.merge(&source, &mut log);

        assert_eq!(doc.print(PrintOptions::Minified), source.print(PrintOptions::Minified));
        assert_eq!(
            log.events(),
            [ChangeEvent::Added {
                parent: vec![],
                index: 0,
                markup: r#"<VStack modifiers><Text id="t">hi</Text></VStack>"#.to_string(),
            }]
        );
    }

    #[test]
    fn test_merge_keeps_node_identity() {
        let mut doc = Document::parse("<VStack><Text>a</Text></VStack>").unwrap();
        let text = doc.node_at(&[0, 0, 0]).unwrap();
        let source = Document::parse("<VStack><Text>b</Text></VStack>").unwrap();
        doc.merge(&source, &mut NullObserver);
        assert_eq!(doc.node_at(&[0, 0, 0]), Some(text));
        assert_eq!(doc.get(text).as_leaf(), Some("b"));
    }

    #[test]
    fn test_fragment_diff_without_statics_uses_template() {
        let mut doc = Document::empty();
        doc.merge_fragment_json(INITIAL, &mut NullObserver).unwrap();
        assert_eq!(doc.to_string(), "<VStack><Text>one</Text><Spacer />two</VStack>");

        let mut log = EventLog::new();
        doc.merge_fragment_json(r#"{"1":"three"}"#, &mut log).unwrap();
        assert_eq!(doc.to_string(), "<VStack><Text>one</Text><Spacer />three</VStack>");
        assert_eq!(
            log.events(),
            [ChangeEvent::TextChanged {
                path: vec![0, 2],
                old: "two".to_string(),
                new: "three".to_string(),
            }]
        );
    }

    #[test]
    fn test_failed_fragment_merge_changes_nothing() {
        let mut doc = Document::empty();
        doc.merge_fragment_json(INITIAL, &mut NullObserver).unwrap();
        let before = doc.clone();
        let template = doc.fragment().cloned();

        let mut log = EventLog::new();
        let err = doc.merge_fragment_json(r#"{"0":"<Text>new</Text>","7":"x"}"#, &mut log).unwrap_err();
        assert!(
            matches!(err, Error::Merge(MergeError::NoSuchSlot { slots: 2, .. })),
            "{err:?}"
        );

        let err = doc.merge_fragment_json(r#"{"0":"<Text>unclosed"}"#, &mut log).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Merge(MergeError::Markup {
                    source: ParseError::MismatchedClose { .. }
                })
            ),
            "{err:?}"
        );

        assert_eq!(log.event_count(), 0);
        assert_eq!(doc.to_string(), before.to_string());
        assert_eq!(doc.fragment().cloned(), template);
    }

    #[test]
    fn test_partial_diff_needs_template() {
        let mut doc = Document::parse("<VStack><Text/><Text/></VStack>").unwrap();
        let err = doc.merge_fragment_json(r#"{"5":"<Text/>"}"#, &mut NullObserver).unwrap_err();
        assert!(
            matches!(err, Error::Merge(MergeError::MissingStatics { .. })),
            "{err:?}"
        );
        assert_eq!(doc.to_string(), "<VStack><Text /><Text /></VStack>");
    }

    #[test]
    fn test_absent_slot_on_parsed_document_is_unresolved() {
        let mut doc = Document::parse("<VStack><Text>a</Text></VStack>").unwrap();
        let err = doc
            .merge_fragment_json(r#"{"s":["<VStack>","</VStack>"]}"#, &mut NullObserver)
            .unwrap_err();
        assert!(
            matches!(err, Error::Merge(MergeError::UnresolvedSlot { ref path }) if path == &[0]),
            "{err:?}"
        );
        assert_eq!(doc.to_string(), "<VStack><Text>a</Text></VStack>");
        assert!(doc.fragment().is_none());
    }

    #[test]
    fn test_merge_document_adopts_template() {
        let mut rendered = Document::empty();
        rendered.merge_fragment_json(INITIAL, &mut NullObserver).unwrap();

        let mut doc = Document::parse("<VStack/>").unwrap();
        doc.merge(&rendered, &mut NullObserver);
        assert_eq!(doc.fragment(), rendered.fragment());

        doc.merge(&Document::parse("<VStack/>").unwrap(), &mut NullObserver);
        assert!(doc.fragment().is_none());
    }
}
