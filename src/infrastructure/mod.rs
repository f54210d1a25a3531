//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Mashup history persistence.
pub mod history_store;
/// Metadata download, compaction and index loading.
pub mod metadata;
pub mod search;

pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use history_store::{DEFAULT_HISTORY_LIMIT, HistoryError, HistoryStore};
pub use metadata::{
    HttpMetadataSource, HttpSourceConfig, IndexLoader, InlineCompactor, ProcessCompactor,
};
pub use search::{EmojiMatch, EmojiSearchProvider, FuzzySearcher};
