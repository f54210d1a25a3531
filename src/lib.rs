//! Emoji Kitchen - mashup lookup backed by a locally compacted index.
//!
//! This crate downloads the upstream Emoji Kitchen metadata once, compacts it
//! into a small index in a worker process, and answers combination queries
//! from that index without further network access.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing the command-line front end.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "emoji-kitchen";
