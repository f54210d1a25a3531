//! Mashup history entries.

use serde::{Deserialize, Serialize};

/// A mashup the user resolved and chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MashupHistoryItem {
    /// First emoji.
    pub left_emoji: String,
    /// Second emoji.
    pub right_emoji: String,
    /// Resolved image URL.
    pub mashup_url: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl MashupHistoryItem {
    /// Creates a history item.
    #[must_use]
    pub fn new(
        left_emoji: impl Into<String>,
        right_emoji: impl Into<String>,
        mashup_url: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            left_emoji: left_emoji.into(),
            right_emoji: right_emoji.into(),
            mashup_url: mashup_url.into(),
            timestamp,
        }
    }

    /// Returns the creation time, if representable.
    #[must_use]
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}
