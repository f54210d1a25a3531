//! Lazily loaded, shared compact index.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::domain::entities::CompactIndex;
use crate::domain::errors::IndexError;

/// Loads the compact index from disk once and hands out shared snapshots.
#[derive(Debug)]
pub struct IndexLoader {
    path: PathBuf,
    cached: RwLock<Option<Arc<CompactIndex>>>,
}

impl IndexLoader {
    /// Creates a loader for the compact file at `path`. Nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: RwLock::new(None),
        }
    }

    /// Path of the compact file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an index is held in memory.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cached.read().is_some()
    }

    /// Returns the cached index, loading it on first use.
    ///
    /// An absent file yields an empty index that is not cached, so a later
    /// call picks the file up once acquisition has produced it.
    ///
    /// # Errors
    /// Returns [`IndexError::Corrupt`] for a file that does not parse (the
    /// file is removed) and [`IndexError::Io`] when it cannot be read.
    pub fn get_index(&self) -> Result<Arc<CompactIndex>, IndexError> {
        if let Some(index) = self.cached.read().as_ref() {
            return Ok(Arc::clone(index));
        }

        let mut cached = self.cached.write();
        if let Some(index) = cached.as_ref() {
            return Ok(Arc::clone(index));
        }

        match self.read_from_disk()? {
            Some(index) => {
                let index = Arc::new(index);
                *cached = Some(Arc::clone(&index));
                Ok(index)
            }
            None => Ok(Arc::new(CompactIndex::new())),
        }
    }

    /// Drops the cached index and loads it again.
    ///
    /// # Errors
    /// Same as [`Self::get_index`].
    pub fn reload(&self) -> Result<Arc<CompactIndex>, IndexError> {
        self.cached.write().take();
        debug!(path = %self.path.display(), "Compact index cache cleared");
        self.get_index()
    }

    fn read_from_disk(&self) -> Result<Option<CompactIndex>, IndexError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Compact index not present yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_reader::<_, CompactIndex>(BufReader::new(file)) {
            Ok(index) => {
                info!(
                    base_emojis = index.len(),
                    combinations = index.combination_count(),
                    "Compact index loaded"
                );
                Ok(Some(index))
            }
            Err(e) if e.is_io() => Err(IndexError::Io(std::io::Error::other(e))),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Compact index is corrupt, removing it");
                if let Err(remove_err) = std::fs::remove_file(&self.path)
                    && remove_err.kind() != ErrorKind::NotFound
                {
                    warn!(error = %remove_err, "Failed to remove corrupt compact index");
                }
                Err(IndexError::corrupt(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INDEX: &str = r#"{"😀":{"n":"Grinning Face","c":{"🐱":"20211115:1f600:1f431"}},"🐱":{"n":"Cat Face","c":{}}}"#;

    #[test]
    fn test_missing_file_yields_empty_uncached_index() {
        let dir = TempDir::new().unwrap();
        let loader = IndexLoader::new(dir.path().join("emoji-kitchen.json"));

        let index = loader.get_index().unwrap();

        assert!(index.is_empty());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_loads_and_caches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji-kitchen.json");
        std::fs::write(&path, INDEX).unwrap();
        let loader = IndexLoader::new(&path);

        let first = loader.get_index().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = loader.get_index().unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_loaded());
    }

    #[test]
    fn test_picks_up_file_created_after_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji-kitchen.json");
        let loader = IndexLoader::new(&path);

        assert!(loader.get_index().unwrap().is_empty());
        std::fs::write(&path, INDEX).unwrap();

        assert_eq!(loader.get_index().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji-kitchen.json");
        std::fs::write(&path, "{\"😀\": {\"n\": ").unwrap();
        let loader = IndexLoader::new(&path);

        let err = loader.get_index().unwrap_err();

        assert!(matches!(err, IndexError::Corrupt { .. }));
        assert!(!path.exists());
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_reload_reads_new_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emoji-kitchen.json");
        std::fs::write(&path, INDEX).unwrap();
        let loader = IndexLoader::new(&path);
        assert_eq!(loader.get_index().unwrap().len(), 2);

        std::fs::write(&path, r#"{"🐱":{"n":"Cat Face","c":{}}}"#).unwrap();
        let reloaded = loader.reload().unwrap();

        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("😀").is_none());
    }
}
