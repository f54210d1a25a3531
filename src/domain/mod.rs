//! Domain layer with core entities, errors, and port definitions.

/// Emoji <-> codepoint string conversion.
pub mod codepoint;
/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use codepoint::{codepoint_to_emoji, emoji_to_codepoint};
pub use entities::{CompactEntry, CompactIndex, EncodedCombination, MetadataPaths};
pub use errors::{AcquisitionError, CodecError, CompactionError, DownloadError, IndexError};
pub use ports::{CompactorPort, MetadataSourcePort, ProgressCallback};
