//! Domain entity definitions.

mod compact;
mod history;
mod metadata_paths;
mod raw_metadata;

pub use compact::{
    COMBINATION_DELIMITER, CombinationParts, CompactEntry, CompactIndex, CompactionStats,
    EmojiInfo, EmptyEntryPolicy, EncodedCombination, Mashup,
};
pub use history::MashupHistoryItem;
pub use metadata_paths::{COMPACT_METADATA_FILE, HISTORY_FILE, MetadataPaths, RAW_METADATA_FILE};
pub use raw_metadata::{EmojiData, RawMetadataDocument, Variant};
