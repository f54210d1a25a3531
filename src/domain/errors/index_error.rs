//! Compact index loading errors.

use thiserror::Error;

/// Errors raised while loading the compact index from disk.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum IndexError {
    #[error("failed to read emoji index: {0}")]
    Io(#[from] std::io::Error),

    #[error("emoji index is corrupt: {message}")]
    Corrupt { message: String },
}

impl IndexError {
    /// Creates corrupt index error.
    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}
