//! Codepoint codec error types.

use thiserror::Error;

/// Raised when a codepoint string cannot be turned back into an emoji.
///
/// Codepoint strings come from the upstream metadata document, so this
/// signals a data integrity problem rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CodecError {
    #[error("invalid hex segment {segment:?} in codepoint string {input:?}")]
    InvalidHex { input: String, segment: String },

    #[error("{value:#x} in codepoint string {input:?} is not a unicode scalar value")]
    InvalidScalar { input: String, value: u32 },
}

impl CodecError {
    /// Creates invalid hex error.
    #[must_use]
    pub fn invalid_hex(input: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::InvalidHex {
            input: input.into(),
            segment: segment.into(),
        }
    }

    /// Creates invalid scalar error.
    #[must_use]
    pub fn invalid_scalar(input: impl Into<String>, value: u32) -> Self {
        Self::InvalidScalar {
            input: input.into(),
            value,
        }
    }
}
