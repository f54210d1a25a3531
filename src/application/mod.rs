//! Application layer with services and use cases.

/// Compaction, URL building, and lookups.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use services::{CompactionOptions, EmojiKitchen};
pub use use_cases::{EnsureMetadataUseCase, MetadataStatus};
