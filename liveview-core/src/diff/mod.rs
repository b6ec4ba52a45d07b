//! Edit scripts between two documents.
//!
//! [`diff`] compares a target tree with a source tree position by position
//! and returns the [`Patch`]es that turn the target into the source. The
//! target is only read; applying the script is a separate step, so a merge
//! can be fully planned before anything changes.
//!
//! Paths in the script are taken from the target as it is before any patch
//! runs. They stay correct as long as the patches are applied in order:
//! positional recursion always finishes a sibling list before trailing
//! children are removed or appended, and trailing removals all address the
//! first trailing index.

mod generator;
mod patch;

pub use generator::diff;
pub use patch::Patch;
