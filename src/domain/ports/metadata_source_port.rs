//! Port for fetching the raw metadata document.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DownloadError;

/// Receives human-readable status lines. Purely observational.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Port for raw metadata retrieval.
#[async_trait]
pub trait MetadataSourcePort: Send + Sync {
    /// Downloads the raw document to `dest` and returns the number of bytes
    /// written. On error nothing is left at `dest`.
    async fn download(
        &self,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<u64, DownloadError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock source serving a fixed body.
    pub struct MockMetadataSource {
        body: String,
        delay: Duration,
        should_fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockMetadataSource {
        /// Creates mock returning `body`.
        pub fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                delay: Duration::ZERO,
                should_fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        /// Delays each download, to keep a sequence in flight.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Sets failure behavior.
        pub fn set_should_fail(&self, value: bool) {
            self.should_fail.store(value, Ordering::SeqCst);
        }

        /// Number of download attempts.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataSourcePort for MockMetadataSource {
        async fn download(
            &self,
            dest: &Path,
            progress: Option<&ProgressCallback>,
        ) -> Result<u64, DownloadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(DownloadError::Incomplete {
                    received: 1,
                    expected: 2,
                });
            }
            if let Some(progress) = progress {
                progress("Downloading emoji data: mock");
            }
            tokio::fs::write(dest, &self.body)
                .await
                .map_err(|e| DownloadError::io(e.to_string()))?;
            Ok(self.body.len() as u64)
        }
    }
}
