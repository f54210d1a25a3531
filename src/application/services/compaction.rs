//! Raw document to compact index transform.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::domain::codepoint::codepoint_to_emoji;
use crate::domain::entities::{
    CompactEntry, CompactIndex, CompactionStats, EmptyEntryPolicy, EncodedCombination,
    RawMetadataDocument, Variant,
};
use crate::domain::errors::CompactionError;

/// Knobs for a compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionOptions {
    /// Handling of base emojis without combinations.
    pub empty_entries: EmptyEntryPolicy,
}

/// Picks the rendering to keep: the one flagged latest, else the first.
#[must_use]
pub fn pick_latest_variant(variants: &[Variant]) -> Option<&Variant> {
    variants
        .iter()
        .find(|v| v.is_latest)
        .or_else(|| variants.first())
}

/// Turns `grinning_face` into `Grinning Face`.
#[must_use]
pub fn format_display_name(alt: &str) -> String {
    alt.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Builds the compact index from the upstream document.
///
/// Base emojis follow `knownSupportedEmoji` order; supported codepoints
/// without a data record are skipped.
///
/// # Errors
/// Returns [`CompactionError::Malformed`] if a codepoint key cannot be decoded.
pub fn compact(
    document: &RawMetadataDocument,
    options: &CompactionOptions,
) -> Result<(CompactIndex, CompactionStats), CompactionError> {
    let mut index = CompactIndex::new();
    let mut stats = CompactionStats::default();

    for codepoint in &document.known_supported_emoji {
        let Some(data) = document.data.get(codepoint) else {
            trace!(codepoint = %codepoint, "Supported emoji has no data record");
            stats.skipped_missing += 1;
            continue;
        };

        let emoji = decode(codepoint)?;

        let mut combinations = IndexMap::with_capacity(data.combinations.len());
        for (partner_codepoint, variants) in &data.combinations {
            let Some(variant) = pick_latest_variant(variants) else {
                continue;
            };
            combinations.insert(
                decode(partner_codepoint)?,
                EncodedCombination::new(
                    &variant.date,
                    &variant.left_emoji_codepoint,
                    &variant.right_emoji_codepoint,
                ),
            );
        }

        if combinations.is_empty() && options.empty_entries == EmptyEntryPolicy::Drop {
            stats.dropped_empty += 1;
            continue;
        }

        stats.combinations += combinations.len();
        index.insert(
            emoji,
            CompactEntry {
                name: format_display_name(&data.alt),
                combinations,
            },
        );
    }

    stats.base_emojis = index.len();
    debug!(
        base_emojis = stats.base_emojis,
        combinations = stats.combinations,
        skipped_missing = stats.skipped_missing,
        dropped_empty = stats.dropped_empty,
        "Compacted metadata"
    );

    Ok((index, stats))
}

fn decode(codepoint: &str) -> Result<String, CompactionError> {
    codepoint_to_emoji(codepoint).map_err(|e| CompactionError::malformed(e.to_string()))
}
