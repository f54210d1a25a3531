//! Upstream raw metadata document.
//!
//! The schema is owned by the upstream emoji-kitchen-backend project. Only the
//! fields needed for compaction are required; everything else is tolerated.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The full upstream document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadataDocument {
    /// Codepoint strings of base emojis the upstream considers supported.
    /// Entries in `data` missing from this list are ignored.
    pub known_supported_emoji: Vec<String>,
    /// Per-emoji records keyed by codepoint string.
    pub data: HashMap<String, EmojiData>,
}

/// Upstream record for a single emoji.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiData {
    /// Underscore-separated name token, e.g. `grinning_face`.
    pub alt: String,
    /// Search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Codepoint string of this emoji.
    #[serde(default)]
    pub emoji_codepoint: String,
    /// Position in the Gboard picker.
    #[serde(default)]
    pub g_board_order: Option<i64>,
    /// Partner codepoint string to every historical rendering, in document order.
    #[serde(default)]
    pub combinations: IndexMap<String, Vec<Variant>>,
}

/// One historical rendering of a combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Upstream image URL.
    #[serde(default)]
    pub g_static_url: String,
    /// Name token of the mashup.
    #[serde(default)]
    pub alt: String,
    /// Left emoji character.
    #[serde(default)]
    pub left_emoji: String,
    /// Left codepoint string as used in the image URL.
    pub left_emoji_codepoint: String,
    /// Right emoji character.
    #[serde(default)]
    pub right_emoji: String,
    /// Right codepoint string as used in the image URL.
    pub right_emoji_codepoint: String,
    /// Release date tag, e.g. `20201001`.
    pub date: String,
    /// Whether this is the current rendering.
    #[serde(default)]
    pub is_latest: bool,
    /// Position in the Gboard picker.
    #[serde(default)]
    pub g_board_order: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_upstream_shape() {
        let json = r#"{
            "knownSupportedEmoji": ["1f600"],
            "data": {
                "1f600": {
                    "alt": "grinning_face",
                    "keywords": ["happy"],
                    "emojiCodepoint": "1f600",
                    "gBoardOrder": 1,
                    "combinations": {
                        "2764-fe0f": [{
                            "gStaticUrl": "https://example.com/a.png",
                            "alt": "grinning_face-red_heart",
                            "leftEmoji": "😀",
                            "leftEmojiCodepoint": "1f600",
                            "rightEmoji": "❤️",
                            "rightEmojiCodepoint": "2764-fe0f",
                            "date": "20201001",
                            "isLatest": true,
                            "gBoardOrder": 1,
                            "extraField": "ignored"
                        }]
                    }
                }
            }
        }"#;

        let doc: RawMetadataDocument = serde_json::from_str(json).unwrap();
        let data = &doc.data["1f600"];
        let variant = &data.combinations["2764-fe0f"][0];

        assert_eq!(doc.known_supported_emoji, vec!["1f600"]);
        assert_eq!(data.alt, "grinning_face");
        assert!(variant.is_latest);
        assert_eq!(variant.right_emoji_codepoint, "2764-fe0f");
    }

    #[test]
    fn test_missing_combinations_defaults_to_empty() {
        let json = r#"{"knownSupportedEmoji": [], "data": {"1f600": {"alt": "grinning_face"}}}"#;
        let doc: RawMetadataDocument = serde_json::from_str(json).unwrap();
        assert!(doc.data["1f600"].combinations.is_empty());
    }

    #[test]
    fn test_combination_order_preserved() {
        let json = r#"{"alt": "x", "combinations": {"2764": [], "1f600": [], "1f431": []}}"#;
        let data: EmojiData = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = data.combinations.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2764", "1f600", "1f431"]);
    }
}
