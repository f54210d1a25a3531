//! Raw metadata download over HTTP.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::errors::DownloadError;
use crate::domain::ports::{MetadataSourcePort, ProgressCallback};

/// Upstream location of the raw metadata document.
pub const DEFAULT_METADATA_URL: &str =
    "https://raw.githubusercontent.com/xsalazar/emoji-kitchen-backend/main/app/metadata.json";

const PROGRESS_STEP_BYTES: u64 = 1024 * 1024;
const MAX_REDIRECTS: usize = 10;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Document URL.
    pub url: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum silence between body reads in seconds.
    pub read_timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_METADATA_URL.to_string(),
            connect_timeout_secs: 15,
            read_timeout_secs: 60,
        }
    }
}

/// Streams the raw document to a staging file and moves it into place only
/// after the byte count checks out.
pub struct HttpMetadataSource {
    client: reqwest::Client,
    url: String,
}

impl std::fmt::Debug for HttpMetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetadataSource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpMetadataSource {
    /// Creates a source with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: HttpSourceConfig) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DownloadError::request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url,
        })
    }

    async fn fetch_to(
        &self,
        staging: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<u64, DownloadError> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
            });
        }

        let expected = response.content_length().filter(|len| *len > 0);
        debug!(url = %self.url, expected_bytes = ?expected, "Starting metadata download");

        let mut file = fs::File::create(staging)
            .await
            .map_err(|e| DownloadError::io(format!("Failed to create staging file: {e}")))?;

        let mut received = 0u64;
        let mut last_reported = 0u64;
        report(progress, received, expected);

        while let Some(chunk) = response.chunk().await.map_err(|e| transport_error(&e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(format!("Failed to write staging file: {e}")))?;
            received += chunk.len() as u64;

            if received - last_reported >= PROGRESS_STEP_BYTES {
                trace!(received = received, "Download progress");
                report(progress, received, expected);
                last_reported = received;
            }
        }

        file.flush()
            .await
            .map_err(|e| DownloadError::io(format!("Failed to flush staging file: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| DownloadError::io(format!("Failed to sync staging file: {e}")))?;

        if let Some(expected) = expected
            && received != expected
        {
            return Err(DownloadError::Incomplete { received, expected });
        }

        report(progress, received, expected);
        Ok(received)
    }
}

#[async_trait]
impl MetadataSourcePort for HttpMetadataSource {
    async fn download(
        &self,
        dest: &Path,
        progress: Option<&ProgressCallback>,
    ) -> Result<u64, DownloadError> {
        let staging = staging_path(dest);

        let result = match self.fetch_to(&staging, progress).await {
            Ok(bytes) => fs::rename(&staging, dest)
                .await
                .map(|()| bytes)
                .map_err(|e| DownloadError::io(format!("Failed to move download into place: {e}"))),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(url = %self.url, error = %e, "Discarding partial metadata download");
            discard(&staging).await;
        }

        result
    }
}

/// `raw-metadata.json` -> `raw-metadata.json.part`.
fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map_or_else(|| OsString::from("download"), OsString::from);
    name.push(".part");
    dest.with_file_name(name)
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "Failed to remove partial download");
    }
}

fn transport_error(error: &reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(error.to_string())
    } else {
        DownloadError::request(error.to_string())
    }
}

fn report(progress: Option<&ProgressCallback>, received: u64, expected: Option<u64>) {
    if let Some(callback) = progress {
        callback(&format_progress(received, expected));
    }
}

/// Renders a download status line.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_progress(received: u64, expected: Option<u64>) -> String {
    let received_mb = received as f64 / BYTES_PER_MB;
    match expected {
        Some(total) if total > 0 => {
            let percent = received.saturating_mul(100) / total;
            format!(
                "Downloading emoji data: {received_mb:.1} / {:.1} MB ({percent}%)",
                total as f64 / BYTES_PER_MB
            )
        }
        _ => format!("Downloading emoji data: {received_mb:.1} MB"),
    }
}
