//! Compact index types: the locally persisted subset of upstream metadata.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Delimiter between the fields of an [`EncodedCombination`].
pub const COMBINATION_DELIMITER: char = ':';

/// `date:leftCodepoint:rightCodepoint`, everything needed to rebuild a
/// mashup image URL.
///
/// The codepoint strings are the upstream variant's own, not re-derived from
/// the emoji characters, since only those are guaranteed to match the image
/// host's file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedCombination(String);

/// Borrowed fields of an [`EncodedCombination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationParts<'a> {
    /// Release date tag.
    pub date: &'a str,
    /// Left codepoint string.
    pub left: &'a str,
    /// Right codepoint string.
    pub right: &'a str,
}

impl EncodedCombination {
    /// Packs the three fields.
    #[must_use]
    pub fn new(date: &str, left: &str, right: &str) -> Self {
        Self(format!(
            "{date}{COMBINATION_DELIMITER}{left}{COMBINATION_DELIMITER}{right}"
        ))
    }

    /// Returns the packed string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits into fields. `None` if any of the three is missing or empty.
    #[must_use]
    pub fn parts(&self) -> Option<CombinationParts<'_>> {
        let mut fields = self.0.splitn(3, COMBINATION_DELIMITER);
        let date = fields.next().filter(|s| !s.is_empty())?;
        let left = fields.next().filter(|s| !s.is_empty())?;
        let right = fields.next().filter(|s| !s.is_empty())?;
        Some(CombinationParts { date, left, right })
    }
}

impl fmt::Display for EncodedCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EncodedCombination {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EncodedCombination {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Compact record for one base emoji.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactEntry {
    /// Human-readable name, e.g. `Grinning Face`.
    #[serde(rename = "n")]
    pub name: String,
    /// Partner emoji to encoded combination, one per partner.
    #[serde(rename = "c", default)]
    pub combinations: IndexMap<String, EncodedCombination>,
}

/// Base emoji to [`CompactEntry`], in compaction order.
///
/// Combinations are stored on only one of the two participating emojis, so
/// pair lookups must check both directions; see [`CompactIndex::combination`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompactIndex {
    entries: IndexMap<String, CompactEntry>,
}

impl CompactIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry, keeping its original position on replace.
    pub fn insert(&mut self, emoji: impl Into<String>, entry: CompactEntry) {
        self.entries.insert(emoji.into(), entry);
    }

    /// Returns the entry for a base emoji.
    #[must_use]
    pub fn get(&self, emoji: &str) -> Option<&CompactEntry> {
        self.entries.get(emoji)
    }

    /// Looks up a pair in either direction.
    #[must_use]
    pub fn combination(&self, a: &str, b: &str) -> Option<&EncodedCombination> {
        self.stored(a, b).or_else(|| self.stored(b, a))
    }

    fn stored(&self, base: &str, partner: &str) -> Option<&EncodedCombination> {
        self.entries.get(base)?.combinations.get(partner)
    }

    /// Iterates entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CompactEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of base emojis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no base emoji is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of stored (directed) combinations.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.entries.values().map(|e| e.combinations.len()).sum()
    }
}

/// What to do with a base emoji that ends up with no combinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyEntryPolicy {
    /// Keep it, so it can still be picked as a first emoji.
    #[default]
    Keep,
    /// Leave it out of the index.
    Drop,
}

impl EmptyEntryPolicy {
    /// Returns the configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Drop => "drop",
        }
    }
}

impl fmt::Display for EmptyEntryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmptyEntryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "drop" => Ok(Self::Drop),
            other => Err(format!("unknown empty entry policy: {other}")),
        }
    }
}

/// Counters reported by a compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionStats {
    /// Base emojis written to the index.
    pub base_emojis: usize,
    /// Combinations written to the index.
    pub combinations: usize,
    /// Supported codepoints with no data record.
    pub skipped_missing: usize,
    /// Base emojis left out by [`EmptyEntryPolicy::Drop`].
    pub dropped_empty: usize,
}

/// A base or partner emoji with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiInfo {
    /// Emoji character sequence.
    pub emoji: String,
    /// Display name, empty when unknown.
    pub name: String,
}

/// A resolved mashup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mashup {
    /// First emoji as queried.
    pub left: String,
    /// Second emoji as queried.
    pub right: String,
    /// Image URL.
    pub url: String,
    /// Release date tag of the rendering.
    pub date: String,
}
