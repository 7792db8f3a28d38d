//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during key encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Key text does not parse as a tagged canonical form.
    ///
    /// The public decode path recovers from this locally by treating the
    /// text as a plain string key; it only surfaces through the strict
    /// decoder.
    #[error("malformed key text: {message}")]
    MalformedKeyText {
        /// Description of the parse failure.
        message: String,
    },

    /// Key text carries no kind tag.
    #[error("key text carries no kind tag")]
    MissingTag,

    /// Key text carries a kind tag this codec does not know.
    #[error("unknown kind tag: {tag:?}")]
    UnknownTag {
        /// The unrecognized tag character.
        tag: char,
    },

    /// A character cannot be represented in the configured key encoding.
    #[error("character {ch:?} is not representable in {encoding}")]
    Unencodable {
        /// The offending character.
        ch: char,
        /// Name of the encoding that rejected it.
        encoding: &'static str,
    },
}

impl CodecError {
    /// Create a malformed key text error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedKeyText {
            message: message.into(),
        }
    }
}
