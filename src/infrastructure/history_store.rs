//! Persistent list of recently resolved mashups.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::MashupHistoryItem;

/// Default number of entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Errors raised while persisting history.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum HistoryError {
    #[error("failed to access history file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode history: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-backed mashup history, most recent first and capped at `limit`.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Creates a store over `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the history. A missing or malformed file is an empty history.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read.
    pub async fn list(&self) -> Result<Vec<MashupHistoryItem>, HistoryError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "History file is malformed, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    /// Records a resolved mashup at the front of the history.
    ///
    /// # Errors
    /// Returns error if the history cannot be written.
    pub async fn append(
        &self,
        left_emoji: &str,
        right_emoji: &str,
        mashup_url: &str,
    ) -> Result<MashupHistoryItem, HistoryError> {
        let _guard = self.write_lock.lock().await;

        let item = MashupHistoryItem::new(
            left_emoji,
            right_emoji,
            mashup_url,
            Utc::now().timestamp_millis(),
        );

        let mut items = self.list().await?;
        items.insert(0, item.clone());
        items.truncate(self.limit);
        self.save(&items).await?;

        debug!(left = left_emoji, right = right_emoji, "Mashup added to history");
        Ok(item)
    }

    /// Removes every entry created at `timestamp`. Returns whether any was found.
    ///
    /// # Errors
    /// Returns error if the history cannot be written.
    pub async fn remove(&self, timestamp: i64) -> Result<bool, HistoryError> {
        let _guard = self.write_lock.lock().await;

        let mut items = self.list().await?;
        let before = items.len();
        items.retain(|item| item.timestamp != timestamp);
        if items.len() == before {
            return Ok(false);
        }
        self.save(&items).await?;
        Ok(true)
    }

    /// Deletes every entry.
    ///
    /// # Errors
    /// Returns error if the history cannot be written.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        self.save(&[]).await
    }

    async fn save(&self, items: &[MashupHistoryItem]) -> Result<(), HistoryError> {
        let content = serde_json::to_string_pretty(items)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, content).await?;
        fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir, limit: usize) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"), limit)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();

        assert!(store(&dir, 10).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_is_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let history = store(&dir, 10);

        history.append("😀", "🐱", "https://a").await.unwrap();
        history.append("🌵", "😀", "https://b").await.unwrap();

        let items = history.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].mashup_url, "https://b");
        assert_eq!(items[1].mashup_url, "https://a");
    }

    #[tokio::test]
    async fn test_append_respects_limit() {
        let dir = TempDir::new().unwrap();
        let history = store(&dir, 2);

        for url in ["1", "2", "3"] {
            history.append("😀", "🐱", url).await.unwrap();
        }

        let urls: Vec<_> = history
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.mashup_url)
            .collect();
        assert_eq!(urls, vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_remove_by_timestamp() {
        let dir = TempDir::new().unwrap();
        let history = store(&dir, 10);
        let item = history.append("😀", "🐱", "https://a").await.unwrap();

        assert!(history.remove(item.timestamp).await.unwrap());
        assert!(!history.remove(item.timestamp).await.unwrap());
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_drops_every_entry_with_timestamp() {
        let dir = TempDir::new().unwrap();
        let items = vec![
            MashupHistoryItem::new("😀", "🐱", "https://a", 1_000),
            MashupHistoryItem::new("🌵", "😀", "https://b", 2_000),
            MashupHistoryItem::new("🐱", "🌵", "https://c", 1_000),
        ];
        std::fs::write(
            dir.path().join("history.json"),
            serde_json::to_string(&items).unwrap(),
        )
        .unwrap();
        let history = store(&dir, 10);

        assert!(history.remove(1_000).await.unwrap());

        let left = history.list().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].mashup_url, "https://b");
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = TempDir::new().unwrap();
        let history = store(&dir, 10);
        history.append("😀", "🐱", "https://a").await.unwrap();

        history.clear().await.unwrap();

        assert!(history.list().await.unwrap().is_empty());
        assert!(dir.path().join("history.json").exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("history.json"), "[{").unwrap();

        assert!(store(&dir, 10).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let dir = TempDir::new().unwrap();
        let history = store(&dir, 10);
        history.append("😀", "🐱", "https://a").await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value[0]["leftEmoji"], "😀");
        assert_eq!(value[0]["rightEmoji"], "🐱");
        assert_eq!(value[0]["mashupUrl"], "https://a");
        assert!(value[0]["timestamp"].is_i64());
    }
}
