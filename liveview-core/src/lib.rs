//! LiveView Core - markup documents kept in sync with a server.
//!
//! This library parses a markup dialect of HTML-like tags, namespaced
//! attributes and text into a [`Document`] and merges updates into it:
//! either a complete replacement document or a compact JSON fragment diff.
//! Every edit a merge makes is reported to a caller-supplied
//! [`ChangeObserver`], so a UI layer can patch just what changed.
//!
//! # Example
//!
//! ```
//! use liveview_core::{ChangeKind, Document, EventLog};
//!
//! let mut doc = Document::parse(
//!     r#"<VStack modifiers=""><VStack><LiveForm id="login"/></VStack></VStack>"#,
//! )?;
//!
//! let mut log = EventLog::new();
//! doc.merge_fragment_json(
//!     r#"{"0":{"0":"<Text>Success!</Text>","s":["<VStack>","</VStack>"]},
//!         "s":["<VStack modifiers>","</VStack>"]}"#,
//!     &mut log,
//! )?;
//!
//! assert_eq!(log.count_by_kind(ChangeKind::Replaced), 1);
//! assert_eq!(doc.to_string(), "<VStack modifiers><VStack><Text>Success!</Text></VStack></VStack>");
//! # Ok::<(), liveview_core::Error>(())
//! ```

pub mod diff;
pub mod document;
pub mod error;
pub mod fragment;
pub mod markup;
pub mod merge;
pub mod node;

pub use document::{Descendants, Document};
pub use error::{DecodeError, Error, MergeError, ParseError, Result};
pub use fragment::{Dynamic, Fragment, FragmentPatch, Slot};
pub use markup::PrintOptions;
pub use merge::{
    merge_document, merge_fragment, merge_fragment_json, ChangeEvent, ChangeKind, ChangeObserver,
    EventLog, NullObserver,
};
pub use node::{Attribute, Element, Name, Node, NodeRef};
