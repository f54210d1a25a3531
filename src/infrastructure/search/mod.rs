use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::domain::entities::EmojiInfo;

/// A service that performs fuzzy searching using the Skim algorithm.
#[derive(Clone)]
pub struct FuzzySearcher {
    matcher: Arc<SkimMatcherV2>,
}

impl Default for FuzzySearcher {
    fn default() -> Self {
        Self {
            matcher: Arc::new(SkimMatcherV2::default()),
        }
    }
}

impl FuzzySearcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn score(&self, choice: &str, pattern: &str) -> Option<i64> {
        self.matcher.fuzzy_match(choice, pattern)
    }
}

/// A scored search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiMatch {
    pub info: EmojiInfo,
    pub score: i64,
}

/// Search provider over base emoji names.
pub struct EmojiSearchProvider {
    emojis: Vec<EmojiInfo>,
    searcher: FuzzySearcher,
}

impl EmojiSearchProvider {
    #[must_use]
    pub fn new(emojis: Vec<EmojiInfo>) -> Self {
        Self {
            emojis,
            searcher: FuzzySearcher::new(),
        }
    }

    /// Returns up to `limit` matches, best first. Typing the emoji itself
    /// ranks it above every name match; a blank query lists in index order.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<EmojiMatch> {
        let query = query.trim();
        if query.is_empty() {
            return self
                .emojis
                .iter()
                .take(limit)
                .map(|info| EmojiMatch {
                    info: info.clone(),
                    score: 0,
                })
                .collect();
        }

        let mut results: Vec<EmojiMatch> = self
            .emojis
            .iter()
            .filter_map(|info| {
                let score = if info.emoji == query {
                    Some(i64::MAX)
                } else {
                    self.searcher.score(&info.name, query)
                }?;
                Some(EmojiMatch {
                    info: info.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(limit);
        results
    }
}
