//! Use case implementations.

mod ensure_metadata_use_case;

pub use ensure_metadata_use_case::{EnsureMetadataUseCase, FileStatus, MetadataStatus};
