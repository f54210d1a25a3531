//! Metadata acquisition error types.

use thiserror::Error;

/// Result type for acquisition operations.
pub type AcquisitionResult<T> = std::result::Result<T, AcquisitionError>;

/// Failures while fetching the raw metadata document.
///
/// Any partially written file is discarded before one of these is returned,
/// so retrying is always safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum DownloadError {
    #[error("request failed: {message}")]
    Request { message: String },

    #[error("request timed out: {message}")]
    Timeout { message: String },

    #[error("server responded with HTTP {status}")]
    Status { status: u16 },

    #[error("download incomplete: received {received} of {expected} bytes")]
    Incomplete { received: u64, expected: u64 },

    #[error("failed to store download: {message}")]
    Io { message: String },
}

impl DownloadError {
    /// Creates request error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Creates local I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }
}

/// Failures while turning the raw document into the compact index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CompactionError {
    /// The raw document itself cannot be used and must be fetched again.
    #[error("emoji data is malformed: {message}")]
    Malformed { message: String },

    /// Reading or writing failed; the raw document is still good.
    #[error("failed to read or write emoji data: {message}")]
    Environment { message: String },

    #[error("compaction worker failed: {message}")]
    Worker { message: String },

    #[error("compaction timed out after {secs}s")]
    Timeout { secs: u64 },
}

impl CompactionError {
    /// Creates malformed document error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates environment error.
    #[must_use]
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment {
            message: message.into(),
        }
    }

    /// Creates worker error.
    #[must_use]
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Returns whether the raw document should be discarded.
    #[must_use]
    pub const fn is_malformed_document(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Error surfaced by the acquisition sequence.
///
/// Cloneable so every caller waiting on a shared in-flight sequence
/// receives the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum AcquisitionError {
    #[error("network problem while fetching emoji data: {0}")]
    Download(DownloadError),

    #[error("processing problem while preparing emoji data: {0}")]
    Compaction(#[from] CompactionError),

    #[error("failed to store emoji data: {message}")]
    Storage { message: String },
}

impl From<DownloadError> for AcquisitionError {
    /// Local staging failures are storage problems, not network ones.
    fn from(error: DownloadError) -> Self {
        match error {
            DownloadError::Io { message } => Self::Storage { message },
            other => Self::Download(other),
        }
    }
}

impl AcquisitionError {
    /// Creates storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Download(_))
    }

    /// Returns whether a later attempt can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Download(
                DownloadError::Request { .. }
                    | DownloadError::Timeout { .. }
                    | DownloadError::Incomplete { .. }
                    | DownloadError::Status { .. }
            ) | Self::Compaction(
                CompactionError::Malformed { .. } | CompactionError::Timeout { .. }
            )
        )
    }
}
