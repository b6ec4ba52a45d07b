//! Resolved fragment templates.

use tracing::trace;

use super::{FragmentPatch, Slot};
use crate::error::MergeError;

/// A fully resolved fragment: `statics.len() == dynamics.len() + 1` at
/// every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    statics: Vec<String>,
    dynamics: Vec<Dynamic>,
}

/// Content of one resolved slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dynamic {
    Markup(String),
    Fragment(Fragment),
}

impl Fragment {
    /// Applies `patch` on top of `previous`, the template the document was
    /// last rendered from.
    ///
    /// Slots absent from the patch keep their previous content. A level
    /// that brings its own statics only inherits slots from a previous
    /// level with identical statics. Nothing is modified on failure.
    pub fn resolve(patch: &FragmentPatch, previous: Option<&Fragment>) -> Result<Self, MergeError> {
        Self::resolve_at(patch, previous, &mut Vec::new())
    }

    fn resolve_at(
        patch: &FragmentPatch,
        previous: Option<&Fragment>,
        path: &mut Vec<usize>,
    ) -> Result<Self, MergeError> {
        let previous = match (&patch.statics, previous) {
            (Some(statics), Some(prev)) if *statics != prev.statics => None,
            (_, prev) => prev,
        };
        let statics = match (&patch.statics, previous) {
            (Some(statics), _) => statics.clone(),
            (None, Some(prev)) => prev.statics.clone(),
            (None, None) => {
                return Err(MergeError::MissingStatics { path: path.clone() });
            }
        };

        let slots = statics.len().saturating_sub(1);
        if let Some((&index, _)) = patch.slots.range(slots..).next() {
            let mut at = path.clone();
            at.push(index);
            return Err(MergeError::NoSuchSlot { path: at, slots });
        }

        let mut dynamics = Vec::with_capacity(slots);
        for index in 0..slots {
            path.push(index);
            let old = previous.and_then(|prev| prev.dynamics.get(index));
            let dynamic = match (patch.slot(index), old) {
                (Some(Slot::Markup(markup)), _) => Dynamic::Markup(markup.clone()),
                (Some(Slot::Fragment(nested)), Some(Dynamic::Fragment(old))) => {
                    Dynamic::Fragment(Self::resolve_at(nested, Some(old), path)?)
                }
                (Some(Slot::Fragment(nested)), _) => {
                    Dynamic::Fragment(Self::resolve_at(nested, None, path)?)
                }
                (None, Some(old)) => old.clone(),
                (None, None) => {
                    return Err(MergeError::UnresolvedSlot { path: path.clone() });
                }
            };
            path.pop();
            dynamics.push(dynamic);
        }

        trace!(?path, slots, "resolved fragment level");
        Ok(Fragment { statics, dynamics })
    }

    /// Returns the static pieces of the top level.
    pub fn statics(&self) -> &[String] {
        &self.statics
    }

    /// Returns the resolved slots of the top level.
    pub fn dynamics(&self) -> &[Dynamic] {
        &self.dynamics
    }

    /// Interleaves statics and dynamics back into markup.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        for (index, piece) in self.statics.iter().enumerate() {
            out.push_str(piece);
            match self.dynamics.get(index) {
                Some(Dynamic::Markup(markup)) => out.push_str(markup),
                Some(Dynamic::Fragment(nested)) => nested.render_into(out),
                None => {}
            }
        }
    }
}
