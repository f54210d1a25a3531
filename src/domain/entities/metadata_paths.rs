//! On-disk layout of the metadata files.

use std::path::{Path, PathBuf};

/// File name of the downloaded upstream document.
pub const RAW_METADATA_FILE: &str = "raw-metadata.json";
/// File name of the compact index.
pub const COMPACT_METADATA_FILE: &str = "emoji-kitchen.json";
/// File name of the mashup history.
pub const HISTORY_FILE: &str = "history.json";

/// Paths of every file kept in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPaths {
    data_dir: PathBuf,
    raw: PathBuf,
    compact: PathBuf,
}

impl MetadataPaths {
    /// Lays out files under `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            raw: data_dir.join(RAW_METADATA_FILE),
            compact: data_dir.join(COMPACT_METADATA_FILE),
            data_dir,
        }
    }

    /// Data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Raw upstream document.
    #[must_use]
    pub fn raw(&self) -> &Path {
        &self.raw
    }

    /// Compact index.
    #[must_use]
    pub fn compact(&self) -> &Path {
        &self.compact
    }

    /// History file.
    #[must_use]
    pub fn history(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    /// Returns true when both the raw document and the compact index exist.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.raw.is_file() && self.compact.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let paths = MetadataPaths::new("/data");
        assert_eq!(paths.raw(), Path::new("/data/raw-metadata.json"));
        assert_eq!(paths.compact(), Path::new("/data/emoji-kitchen.json"));
        assert_eq!(paths.history(), PathBuf::from("/data/history.json"));
    }

    #[test]
    fn test_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let paths = MetadataPaths::new(dir.path());
        assert!(!paths.is_complete());

        std::fs::write(paths.raw(), "{}").unwrap();
        assert!(!paths.is_complete());

        std::fs::write(paths.compact(), "{}").unwrap();
        assert!(paths.is_complete());
    }
}
