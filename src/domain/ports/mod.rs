//! Port definitions.

mod compactor_port;
mod metadata_source_port;

pub use compactor_port::CompactorPort;
pub use metadata_source_port::{MetadataSourcePort, ProgressCallback};
