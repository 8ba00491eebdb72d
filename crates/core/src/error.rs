use alloc::string::String;

/// Errors raised before anything reaches the hash
///
/// A wrong digest silently rejects a correct answer, so malformed input is
/// refused instead of hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// Input that is not text, or a digest that is not well-formed hex
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A character the active code-unit policy cannot map unambiguously
    #[error("character {ch:?} at position {index} has no unambiguous code unit")]
    EncodingMismatch { index: usize, ch: char },
}
