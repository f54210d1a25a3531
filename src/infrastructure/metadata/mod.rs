//! Emoji metadata adapters: download, compaction workers, and index loading.

mod compactor;
mod http_source;
mod index_loader;

pub use compactor::{
    DEFAULT_COMPACTION_TIMEOUT, EXIT_IO, EXIT_MALFORMED, InlineCompactor, ProcessCompactor,
    WORKER_SUBCOMMAND, compact_file, run_worker,
};
pub use http_source::{DEFAULT_METADATA_URL, HttpMetadataSource, HttpSourceConfig, format_progress};
pub use index_loader::IndexLoader;
