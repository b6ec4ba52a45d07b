//! Error types for liveview-core.

use thiserror::Error;

/// Result type alias for operations that can fail with any [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error for the document-level convenience entry points.
#[derive(Error, Debug)]
pub enum Error {
    /// Markup could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Fragment JSON could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A decoded patch could not be merged.
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Malformed markup.
///
/// Positions are byte offsets into the parsed input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `<` was never closed by a matching `>`.
    #[error("unterminated tag at byte {position}")]
    UnterminatedTag { position: u64 },

    /// Input ended while an element was still open.
    #[error("unclosed element <{tag}> at end of input")]
    UnclosedElement { tag: String },

    /// A closing tag does not match the innermost open element.
    #[error("mismatched closing tag at byte {position}: expected </{expected}>, found </{found}>")]
    MismatchedClose {
        position: u64,
        expected: String,
        found: String,
    },

    /// A closing tag appeared with no element open.
    #[error("unexpected closing tag </{tag}> at byte {position}")]
    UnexpectedClose { position: u64, tag: String },

    /// An attribute is not `name`, `name="value"` or `ns:name="value"`.
    #[error("invalid attribute syntax at byte {position}: {message}")]
    InvalidAttribute { position: u64, message: String },

    /// A tag or attribute name contains characters outside the dialect.
    #[error("invalid name {name:?} at byte {position}")]
    InvalidName { position: u64, name: String },

    /// A `prefix:name` pair with an empty or malformed prefix.
    #[error("invalid namespace prefix in {name:?} at byte {position}")]
    InvalidNamespace { position: u64, name: String },

    /// Any other tokenizer failure.
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },
}

/// Fragment JSON that does not follow the wire format.
///
/// `path` is the chain of positional keys leading to the offending level.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Not JSON at all.
    #[error("malformed fragment JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A fragment level is not a JSON object.
    #[error("fragment at {path:?} must be an object, found {found}")]
    NotAnObject { path: Vec<usize>, found: &'static str },

    /// A key that is neither `"s"` nor a canonical non-negative integer.
    #[error("invalid key {key:?} in fragment at {path:?}")]
    InvalidKey { path: Vec<usize>, key: String },

    /// A dynamic slot holding something other than a string or object.
    #[error("slot {path:?} must be a string or an object, found {found}")]
    InvalidSlot { path: Vec<usize>, found: &'static str },

    /// `"s"` is not a non-empty array of strings.
    #[error("statics of fragment at {path:?} must be a non-empty array of strings")]
    InvalidStatics { path: Vec<usize> },

    /// A slot key beyond the slot count implied by the level's own statics.
    #[error("slot {index} of fragment at {path:?} is out of range ({slots} slots)")]
    SlotOutOfRange {
        path: Vec<usize>,
        index: usize,
        slots: usize,
    },
}

/// A patch that cannot be applied to the target document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// A level without `"s"` and no retained template to take it from.
    #[error("fragment at {path:?} has no statics and the document holds no template for it")]
    MissingStatics { path: Vec<usize> },

    /// A key addresses a slot the template does not have.
    #[error("fragment addresses slot {path:?}, which does not exist ({slots} slots)")]
    NoSuchSlot { path: Vec<usize>, slots: usize },

    /// A slot is absent and there is no previous content to keep.
    #[error("slot {path:?} is absent and the document holds no content for it")]
    UnresolvedSlot { path: Vec<usize> },

    /// The reconstructed markup is not valid.
    #[error("reconstructed markup failed to parse: {source}")]
    Markup {
        #[source]
        source: ParseError,
    },
}
