//! Query surface over a loaded compact index.

use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::warn;

use crate::domain::entities::{CompactIndex, EmojiInfo, Mashup};

use super::mashup_url::build_url;

/// Read-only lookups over one index snapshot.
///
/// Misses are never errors: unknown emojis yield empty lists and unknown
/// pairs yield `None`. Pair queries check both directions because upstream
/// stores each combination on only one of its emojis.
#[derive(Debug, Clone, Default)]
pub struct EmojiKitchen {
    index: Arc<CompactIndex>,
}

impl EmojiKitchen {
    /// Wraps an index snapshot.
    #[must_use]
    pub const fn new(index: Arc<CompactIndex>) -> Self {
        Self { index }
    }

    /// Returns the underlying index.
    #[must_use]
    pub fn index(&self) -> &CompactIndex {
        &self.index
    }

    /// Display name of a base emoji.
    #[must_use]
    pub fn name_of(&self, emoji: &str) -> Option<&str> {
        self.index.get(emoji).map(|entry| entry.name.as_str())
    }

    /// Every base emoji, in index order.
    #[must_use]
    pub fn list_base_emojis(&self) -> Vec<EmojiInfo> {
        self.index
            .iter()
            .map(|(emoji, entry)| EmojiInfo {
                emoji: emoji.to_string(),
                name: entry.name.clone(),
            })
            .collect()
    }

    /// Partners stored under `emoji`. Empty if `emoji` is unknown.
    #[must_use]
    pub fn list_combinations(&self, emoji: &str) -> Vec<EmojiInfo> {
        let Some(entry) = self.index.get(emoji) else {
            return Vec::new();
        };
        entry
            .combinations
            .keys()
            .map(|partner| EmojiInfo {
                emoji: partner.clone(),
                name: self.name_of(partner).unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Returns true if a mashup exists for the pair in either order.
    #[must_use]
    pub fn is_valid_pair(&self, a: &str, b: &str) -> bool {
        self.index.combination(a, b).is_some()
    }

    /// Resolves a pair in either order to its mashup.
    #[must_use]
    pub fn resolve_pair(&self, a: &str, b: &str) -> Option<Mashup> {
        let combination = self.index.combination(a, b)?;
        let Some(url) = build_url(combination) else {
            warn!(left = a, right = b, combination = %combination, "Malformed combination in index");
            return None;
        };
        let date = combination.parts().map(|p| p.date.to_string())?;
        Some(Mashup {
            left: a.to_string(),
            right: b.to_string(),
            url,
            date,
        })
    }

    /// Every stored pair, in the direction it is stored.
    #[must_use]
    pub fn list_all_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.index.combination_count());
        for (left, entry) in self.index.iter() {
            for right in entry.combinations.keys() {
                pairs.push((left.to_string(), right.clone()));
            }
        }
        pairs
    }

    /// Picks a stored pair uniformly at random.
    pub fn random_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(String, String)> {
        self.list_all_pairs().choose(rng).cloned()
    }
}
