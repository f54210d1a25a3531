//! Application services.

pub mod compaction;
pub mod lookup;
pub mod mashup_url;

pub use compaction::{CompactionOptions, compact, format_display_name, pick_latest_variant};
pub use lookup::EmojiKitchen;
pub use mashup_url::{MASHUP_BASE_URL, build_url};
