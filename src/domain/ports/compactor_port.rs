//! Port for running the compaction step.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::entities::CompactionStats;
use crate::domain::errors::CompactionError;

/// Port for turning the raw document on disk into the compact index on disk.
///
/// Implementations decide where the work runs; the point of the boundary is
/// keeping peak memory of the transform away from the long-lived process.
#[async_trait]
pub trait CompactorPort: Send + Sync {
    /// Reads `raw`, writes `compact`.
    async fn compact(&self, raw: &Path, compact: &Path) -> Result<CompactionStats, CompactionError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock compactor writing a fixed index.
    pub struct MockCompactor {
        output: String,
        delay: Duration,
        failure: Mutex<Option<CompactionError>>,
        calls: AtomicUsize,
    }

    impl MockCompactor {
        /// Creates mock writing `output` to the compact path.
        pub fn new(output: impl Into<String>) -> Self {
            Self {
                output: output.into(),
                delay: Duration::ZERO,
                failure: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        /// Delays each run.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Makes subsequent runs fail with `error`, or succeed with `None`.
        pub fn set_failure(&self, error: Option<CompactionError>) {
            *self.failure.lock() = error;
        }

        /// Number of compaction runs.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompactorPort for MockCompactor {
        async fn compact(
            &self,
            _raw: &Path,
            compact: &Path,
        ) -> Result<CompactionStats, CompactionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let failure = self.failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            tokio::fs::write(compact, &self.output)
                .await
                .map_err(|e| CompactionError::environment(e.to_string()))?;
            Ok(CompactionStats::default())
        }
    }
}
