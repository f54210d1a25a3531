//! Presentation layer: the command-line front end.

/// Subcommand execution and output formatting.
pub mod cli;

pub use cli::{App, progress_printer};
