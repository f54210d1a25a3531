//! Domain error types.

mod acquisition_error;
mod codec_error;
mod index_error;

pub use acquisition_error::{AcquisitionError, AcquisitionResult, CompactionError, DownloadError};
pub use codec_error::CodecError;
pub use index_error::IndexError;
