//! Metadata acquisition: download, compact, and guard against duplicate work.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::domain::entities::MetadataPaths;
use crate::domain::errors::{AcquisitionError, AcquisitionResult};
use crate::domain::ports::{CompactorPort, MetadataSourcePort, ProgressCallback};

type SharedAcquisition = Shared<BoxFuture<'static, AcquisitionResult<()>>>;

/// Presence and size of one metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// File path.
    pub path: PathBuf,
    /// Size in bytes, `None` if the file is missing.
    pub size: Option<u64>,
}

impl FileStatus {
    fn probe(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            size: std::fs::metadata(path)
                .ok()
                .filter(std::fs::Metadata::is_file)
                .map(|m| m.len()),
        }
    }

    /// Returns true if the file exists.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.size.is_some()
    }
}

/// Snapshot of the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataStatus {
    /// Data directory.
    pub data_dir: PathBuf,
    /// Raw upstream document.
    pub raw: FileStatus,
    /// Compact index.
    pub compact: FileStatus,
    /// Whether an acquisition sequence is running in this process.
    pub in_flight: bool,
}

/// Makes sure the compact index exists on disk, fetching and compacting the
/// upstream document when needed.
///
/// At most one sequence runs per instance; concurrent callers await the same
/// shared future and see the same outcome.
pub struct EnsureMetadataUseCase {
    context: Arc<AcquisitionContext>,
    in_flight: Mutex<Option<SharedAcquisition>>,
}

struct AcquisitionContext {
    paths: MetadataPaths,
    source: Arc<dyn MetadataSourcePort>,
    compactor: Arc<dyn CompactorPort>,
}

/// Clears the in-flight slot once the registered sequence has settled.
///
/// An unfinished sequence stays registered when its caller goes away, so the
/// next caller resumes it instead of starting a second download.
struct InFlightRelease<'a> {
    slot: &'a Mutex<Option<SharedAcquisition>>,
    operation: SharedAcquisition,
}

impl Drop for InFlightRelease<'_> {
    fn drop(&mut self) {
        if self.operation.peek().is_none() {
            return;
        }
        let mut slot = self.slot.lock();
        if slot
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&self.operation))
        {
            *slot = None;
        }
    }
}

impl EnsureMetadataUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(
        paths: MetadataPaths,
        source: Arc<dyn MetadataSourcePort>,
        compactor: Arc<dyn CompactorPort>,
    ) -> Self {
        Self {
            context: Arc::new(AcquisitionContext {
                paths,
                source,
                compactor,
            }),
            in_flight: Mutex::new(None),
        }
    }

    /// Returns the file layout.
    #[must_use]
    pub fn paths(&self) -> &MetadataPaths {
        &self.context.paths
    }

    /// Returns true if a sequence is currently registered.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Ensures both metadata files exist.
    ///
    /// Returns immediately when they already do. Otherwise downloads the raw
    /// document if missing and compacts it if the compact index is missing.
    /// `on_progress` only sees status lines when this call starts the
    /// sequence; joining callers just wait.
    ///
    /// # Errors
    /// Returns the download or compaction failure of the shared sequence.
    pub async fn execute(&self, on_progress: Option<ProgressCallback>) -> AcquisitionResult<()> {
        let operation = {
            let mut slot = self.in_flight.lock();
            if let Some(existing) = slot.as_ref() {
                debug!("Metadata acquisition already in progress, waiting");
                existing.clone()
            } else if self.context.paths.is_complete() {
                debug!("Metadata files already exist");
                return Ok(());
            } else {
                let context = Arc::clone(&self.context);
                let operation = async move { context.run(on_progress.as_ref()).await }
                    .boxed()
                    .shared();
                *slot = Some(operation.clone());
                operation
            }
        };

        self.await_registered(operation).await
    }

    /// Deletes both metadata files and acquires them again.
    ///
    /// A sequence already in flight is allowed to settle first.
    ///
    /// # Errors
    /// Returns the download or compaction failure of the new sequence.
    pub async fn refresh(&self, on_progress: Option<ProgressCallback>) -> AcquisitionResult<()> {
        let pending = self.in_flight.lock().clone();
        if let Some(pending) = pending {
            debug!("Waiting for running acquisition before refresh");
            if let Err(e) = self.await_registered(pending).await {
                debug!(error = %e, "Acquisition before refresh failed");
            }
        }

        let operation = {
            let mut slot = self.in_flight.lock();
            if let Some(existing) = slot.as_ref() {
                existing.clone()
            } else {
                let context = Arc::clone(&self.context);
                let operation = async move {
                    context.reset().await?;
                    context.run(on_progress.as_ref()).await
                }
                .boxed()
                .shared();
                *slot = Some(operation.clone());
                operation
            }
        };

        self.await_registered(operation).await
    }

    /// Reports presence and size of the metadata files.
    #[must_use]
    pub fn status(&self) -> MetadataStatus {
        let paths = &self.context.paths;
        MetadataStatus {
            data_dir: paths.data_dir().to_path_buf(),
            raw: FileStatus::probe(paths.raw()),
            compact: FileStatus::probe(paths.compact()),
            in_flight: self.is_in_flight(),
        }
    }

    async fn await_registered(&self, operation: SharedAcquisition) -> AcquisitionResult<()> {
        let _release = InFlightRelease {
            slot: &self.in_flight,
            operation: operation.clone(),
        };
        operation.await
    }
}

impl AcquisitionContext {
    async fn run(&self, on_progress: Option<&ProgressCallback>) -> AcquisitionResult<()> {
        let report = |status: &str| {
            if let Some(callback) = on_progress {
                callback(status);
            }
        };

        fs::create_dir_all(self.paths.data_dir())
            .await
            .map_err(|e| AcquisitionError::storage(e.to_string()))?;

        let raw = self.paths.raw();
        let compact = self.paths.compact();

        if raw.is_file() {
            debug!("Raw metadata already exists");
        } else {
            info!(path = %raw.display(), "Downloading raw metadata");
            let bytes = self.source.download(raw, on_progress).await.map_err(|e| {
                error!(error = %e, "Metadata download failed");
                e
            })?;
            info!(bytes = bytes, "Metadata download complete");
        }

        if compact.is_file() {
            debug!("Compact metadata already exists");
        } else {
            report("Processing emoji data...");
            match self.compactor.compact(raw, compact).await {
                Ok(stats) => {
                    info!(
                        base_emojis = stats.base_emojis,
                        combinations = stats.combinations,
                        "Metadata processing complete"
                    );
                }
                Err(e) if e.is_malformed_document() => {
                    warn!(error = %e, "Raw metadata is malformed, deleting it so it is downloaded again");
                    remove_if_exists(raw).await;
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, "Metadata processing failed, keeping raw metadata for retry");
                    return Err(e.into());
                }
            }
        }

        report("Ready");
        Ok(())
    }

    async fn reset(&self) -> AcquisitionResult<()> {
        info!("Deleting metadata files for refresh");
        for path in [self.paths.compact(), self.paths.raw()] {
            match fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Deleted metadata file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(AcquisitionError::storage(e.to_string())),
            }
        }
        Ok(())
    }
}

async fn remove_if_exists(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Failed to delete metadata file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{CompactionError, DownloadError};
    use crate::domain::ports::mocks::{MockCompactor, MockMetadataSource};
    use std::time::Duration;
    use tempfile::TempDir;

    const RAW: &str = r#"{"knownSupportedEmoji": [], "data": {}}"#;
    const COMPACT: &str = "{}";

    struct Harness {
        _dir: TempDir,
        paths: MetadataPaths,
        source: Arc<MockMetadataSource>,
        compactor: Arc<MockCompactor>,
        use_case: Arc<EnsureMetadataUseCase>,
    }

    fn harness_with(source: MockMetadataSource, compactor: MockCompactor) -> Harness {
        let dir = TempDir::new().unwrap();
        let paths = MetadataPaths::new(dir.path().join("data"));
        let source = Arc::new(source);
        let compactor = Arc::new(compactor);
        let use_case = Arc::new(EnsureMetadataUseCase::new(
            paths.clone(),
            source.clone(),
            compactor.clone(),
        ));
        Harness {
            _dir: dir,
            paths,
            source,
            compactor,
            use_case,
        }
    }

    fn harness() -> Harness {
        harness_with(MockMetadataSource::new(RAW), MockCompactor::new(COMPACT))
    }

    #[tokio::test]
    async fn test_first_run_downloads_and_compacts() {
        let h = harness();

        tokio_test::assert_ok!(h.use_case.execute(None).await);

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.compactor.calls(), 1);
        assert!(h.paths.is_complete());
        assert!(!h.use_case.is_in_flight());
    }

    #[tokio::test]
    async fn test_second_call_is_idempotent() {
        let h = harness();

        h.use_case.execute(None).await.unwrap();
        h.use_case.execute(None).await.unwrap();

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.compactor.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_sequence() {
        let h = harness_with(
            MockMetadataSource::new(RAW).with_delay(Duration::from_millis(50)),
            MockCompactor::new(COMPACT).with_delay(Duration::from_millis(20)),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let use_case = h.use_case.clone();
            handles.push(tokio::spawn(async move { use_case.execute(None).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.compactor.calls(), 1);
        assert!(!h.use_case.is_in_flight());
    }

    #[tokio::test]
    async fn test_concurrent_callers_observe_same_failure() {
        let h = harness_with(
            MockMetadataSource::new(RAW).with_delay(Duration::from_millis(50)),
            MockCompactor::new(COMPACT),
        );
        h.source.set_should_fail(true);

        let (a, b) = tokio::join!(h.use_case.execute(None), h.use_case.execute(None));

        assert_eq!(h.source.calls(), 1);
        assert_eq!(a, b);
        assert!(matches!(
            a,
            Err(AcquisitionError::Download(DownloadError::Incomplete { .. }))
        ));
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let h = harness();
        h.source.set_should_fail(true);

        let err = h.use_case.execute(None).await.unwrap_err();
        assert!(err.is_network_error());
        assert!(!h.use_case.is_in_flight());
        assert!(!h.paths.raw().exists());

        h.source.set_should_fail(false);
        tokio_test::assert_ok!(h.use_case.execute(None).await);
        assert_eq!(h.source.calls(), 2);
        assert!(h.paths.is_complete());
    }

    #[tokio::test]
    async fn test_malformed_document_deletes_raw() {
        let h = harness();
        h.compactor
            .set_failure(Some(CompactionError::malformed("unexpected end of input")));

        let err = h.use_case.execute(None).await.unwrap_err();

        assert!(matches!(err, AcquisitionError::Compaction(_)));
        assert!(!h.paths.raw().exists());

        h.compactor.set_failure(None);
        h.use_case.execute(None).await.unwrap();
        assert_eq!(h.source.calls(), 2);
    }

    #[tokio::test]
    async fn test_environment_failure_keeps_raw() {
        let h = harness();
        h.compactor
            .set_failure(Some(CompactionError::environment("no space left on device")));

        h.use_case.execute(None).await.unwrap_err();
        assert!(h.paths.raw().exists());
        assert!(!h.paths.compact().exists());

        h.compactor.set_failure(None);
        h.use_case.execute(None).await.unwrap();
        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.compactor.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_compact_regenerated_without_download() {
        let h = harness();
        std::fs::create_dir_all(h.paths.data_dir()).unwrap();
        std::fs::write(h.paths.raw(), RAW).unwrap();

        h.use_case.execute(None).await.unwrap();

        assert_eq!(h.source.calls(), 0);
        assert_eq!(h.compactor.calls(), 1);
    }

    #[tokio::test]
    async fn test_progress_reports_ready() {
        let h = harness();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let callback: ProgressCallback = Arc::new(move |status: &str| sink.lock().push(status.to_string()));

        h.use_case.execute(Some(callback)).await.unwrap();

        let seen = seen.lock();
        assert!(seen.iter().any(|s| s == "Processing emoji data..."));
        assert_eq!(seen.last().map(String::as_str), Some("Ready"));
    }

    #[tokio::test]
    async fn test_refresh_fetches_again() {
        let h = harness();
        h.use_case.execute(None).await.unwrap();

        h.use_case.refresh(None).await.unwrap();

        assert_eq!(h.source.calls(), 2);
        assert_eq!(h.compactor.calls(), 2);
        assert!(h.paths.is_complete());
    }

    #[tokio::test]
    async fn test_status() {
        let h = harness();
        let before = h.use_case.status();
        assert!(!before.raw.exists());
        assert!(!before.compact.exists());

        h.use_case.execute(None).await.unwrap();

        let after = h.use_case.status();
        assert_eq!(after.raw.size, Some(RAW.len() as u64));
        assert_eq!(after.compact.size, Some(COMPACT.len() as u64));
        assert!(!after.in_flight);
    }
}
