//! Fragment diffs.
//!
//! A server describes a rendered tree as a *fragment*: an ordered list of
//! static markup pieces (`"s"`) with dynamic slots between them, keyed by
//! position (`"0"`, `"1"`, ...). A slot holds either literal markup or a
//! nested fragment. Diffs after the first render may leave out the statics
//! and any slot that did not change.
//!
//! ```json
//! {"0": {"0": "<Text>Hi</Text>", "s": ["<VStack>", "</VStack>"]},
//!  "s": ["<VStack modifiers>", "</VStack>"]}
//! ```
//!
//! [`FragmentPatch`] is the decoded wire form. [`Fragment`] is a fully
//! resolved template: every level has statics and every slot has content,
//! so it can be rendered back to markup.

mod decode;
mod template;

use std::collections::BTreeMap;

use crate::error::MergeError;

pub use template::{Dynamic, Fragment};

/// Key holding the static pieces of a fragment level.
pub const STATICS_KEY: &str = "s";

/// A decoded fragment diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentPatch {
    statics: Option<Vec<String>>,
    slots: BTreeMap<usize, Slot>,
}

/// Content of one dynamic slot in a [`FragmentPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Literal markup spliced in as-is.
    Markup(String),
    /// A nested fragment level.
    Fragment(FragmentPatch),
}

impl FragmentPatch {
    /// Creates an empty patch: no statics, every slot kept as is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the static pieces of this level.
    ///
    /// # Panics
    ///
    /// Panics if `statics` is empty; a level always has at least one piece.
    pub fn with_statics<I, S>(mut self, statics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statics: Vec<String> = statics.into_iter().map(Into::into).collect();
        assert!(!statics.is_empty(), "a fragment level has at least one static piece");
        self.statics = Some(statics);
        self
    }

    /// Sets the content of slot `index`.
    pub fn with_slot(mut self, index: usize, slot: Slot) -> Self {
        self.slots.insert(index, slot);
        self
    }

    /// Returns the static pieces, if this level carries them.
    pub fn statics(&self) -> Option<&[String]> {
        self.statics.as_deref()
    }

    /// Returns the content of slot `index`, `None` if it is kept as is.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(&index)
    }

    /// Iterates the slots present in this level, by position.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Slot)> {
        self.slots.iter().map(|(&index, slot)| (index, slot))
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.statics.is_none() && self.slots.is_empty()
    }

    /// Renders this patch on its own, without a previous template.
    ///
    /// Fails unless every level carries statics and every slot is present.
    pub fn to_markup(&self) -> Result<String, MergeError> {
        Ok(Fragment::resolve(self, None)?.render())
    }
}

impl From<String> for Slot {
    fn from(markup: String) -> Self {
        Slot::Markup(markup)
    }
}

impl From<&str> for Slot {
    fn from(markup: &str) -> Self {
        Slot::Markup(markup.to_string())
    }
}

impl From<FragmentPatch> for Slot {
    fn from(patch: FragmentPatch) -> Self {
        Slot::Fragment(patch)
    }
}
