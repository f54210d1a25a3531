//! Compaction runners: a child process for isolation, or a blocking task.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::application::services::compaction::{CompactionOptions, compact};
use crate::domain::entities::{CompactIndex, CompactionStats, RawMetadataDocument};
use crate::domain::errors::CompactionError;
use crate::domain::ports::CompactorPort;

/// Hidden subcommand the binary answers to when acting as the worker.
pub const WORKER_SUBCOMMAND: &str = "compact-worker";

/// Worker exit code for an unusable raw document (`EX_DATAERR`).
pub const EXIT_MALFORMED: i32 = 65;

/// Worker exit code for read/write failures (`EX_IOERR`).
pub const EXIT_IO: i32 = 74;

/// Default limit for one compaction run.
pub const DEFAULT_COMPACTION_TIMEOUT: Duration = Duration::from_secs(300);

/// `emoji-kitchen.json` -> `emoji-kitchen.json.part`.
fn staging_path(compact_path: &Path) -> PathBuf {
    let mut name = compact_path
        .file_name()
        .map_or_else(|| OsString::from("compact"), OsString::from);
    name.push(".part");
    compact_path.with_file_name(name)
}

/// Reads the raw document at `raw`, compacts it, and writes the index to
/// `compact` through a `.part` file next to it.
///
/// # Errors
/// Parse failures are [`CompactionError::Malformed`]; read and write
/// failures are [`CompactionError::Environment`].
pub fn compact_file(
    raw: &Path,
    compact_path: &Path,
    options: &CompactionOptions,
) -> Result<CompactionStats, CompactionError> {
    let file = File::open(raw)
        .map_err(|e| CompactionError::environment(format!("Failed to open raw metadata: {e}")))?;

    let document: RawMetadataDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            if e.is_io() {
                CompactionError::environment(format!("Failed to read raw metadata: {e}"))
            } else {
                CompactionError::malformed(format!("Failed to parse raw metadata: {e}"))
            }
        })?;

    let (index, stats) = compact(&document, options)?;
    drop(document);

    let staging = staging_path(compact_path);
    let written = write_index(&staging, &index).and_then(|()| {
        std::fs::rename(&staging, compact_path).map_err(|e| {
            CompactionError::environment(format!("Failed to move compact index into place: {e}"))
        })
    });
    if written.is_err() {
        discard_staging(&staging);
    }
    written.map(|()| stats)
}

fn write_index(staging: &Path, index: &CompactIndex) -> Result<(), CompactionError> {
    let write_err =
        |e: std::io::Error| CompactionError::environment(format!("Failed to write compact index: {e}"));

    let file = File::create(staging).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, index)
        .map_err(|e| CompactionError::environment(format!("Failed to serialize compact index: {e}")))?;
    writer.flush().map_err(write_err)?;
    writer.get_ref().sync_all().map_err(write_err)
}

fn discard_staging(staging: &Path) {
    if let Err(e) = std::fs::remove_file(staging)
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %staging.display(), error = %e, "Failed to remove partial compact index");
    }
}

/// Entry point of the worker process. Prints stats as JSON on stdout and
/// returns the process exit code.
#[must_use]
pub fn run_worker(raw: &Path, compact_path: &Path, options: &CompactionOptions) -> i32 {
    match compact_file(raw, compact_path, options) {
        Ok(stats) => {
            match serde_json::to_string(&stats) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("failed to encode stats: {e}"),
            }
            0
        }
        Err(e) => {
            eprintln!("{e}");
            match e {
                CompactionError::Malformed { .. } => EXIT_MALFORMED,
                _ => EXIT_IO,
            }
        }
    }
}

/// Runs compaction in a child process so the parse of the raw document never
/// inflates the long-lived process.
#[derive(Debug, Clone)]
pub struct ProcessCompactor {
    program: PathBuf,
    options: CompactionOptions,
    timeout: Duration,
}

impl ProcessCompactor {
    /// Uses `program` as the worker executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, options: CompactionOptions, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            options,
            timeout,
        }
    }

    /// Re-invokes the running executable as the worker.
    ///
    /// # Errors
    /// Returns error if the current executable cannot be located.
    pub fn current_exe(options: CompactionOptions, timeout: Duration) -> Result<Self, CompactionError> {
        let program = std::env::current_exe().map_err(|e| {
            CompactionError::worker(format!("Failed to locate current executable: {e}"))
        })?;
        Ok(Self::new(program, options, timeout))
    }
}

#[async_trait]
impl CompactorPort for ProcessCompactor {
    async fn compact(&self, raw: &Path, compact_path: &Path) -> Result<CompactionStats, CompactionError> {
        debug!(program = %self.program.display(), "Spawning compaction worker");

        let child = Command::new(&self.program)
            .arg(WORKER_SUBCOMMAND)
            .arg("--empty-entries")
            .arg(self.options.empty_entries.as_str())
            .arg(raw)
            .arg(compact_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CompactionError::worker(format!("Failed to spawn compaction worker: {e}")))?;

        let staging = staging_path(compact_path);
        let Ok(waited) = tokio::time::timeout(self.timeout, child.wait_with_output()).await else {
            warn!(timeout_secs = self.timeout.as_secs(), "Compaction worker timed out, killed");
            remove_staging(&staging).await;
            return Err(CompactionError::Timeout {
                secs: self.timeout.as_secs(),
            });
        };
        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                remove_staging(&staging).await;
                return Err(CompactionError::worker(format!(
                    "Failed to wait for compaction worker: {e}"
                )));
            }
        };

        if output.status.success() {
            let stats = String::from_utf8_lossy(&output.stdout)
                .lines()
                .rev()
                .find_map(|line| serde_json::from_str::<CompactionStats>(line).ok())
                .unwrap_or_default();
            info!(
                base_emojis = stats.base_emojis,
                combinations = stats.combinations,
                "Compaction worker finished"
            );
            return Ok(stats);
        }

        remove_staging(&staging).await;
        let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(match output.status.code() {
            Some(EXIT_MALFORMED) => CompactionError::malformed(diagnostic),
            Some(EXIT_IO) => CompactionError::environment(diagnostic),
            Some(code) => CompactionError::worker(format!("exited with status {code}: {diagnostic}")),
            None => CompactionError::worker(format!("terminated by signal: {diagnostic}")),
        })
    }
}

/// Removes what a killed or failed worker left behind.
async fn remove_staging(staging: &Path) {
    if let Err(e) = tokio::fs::remove_file(staging).await
        && e.kind() != ErrorKind::NotFound
    {
        warn!(path = %staging.display(), error = %e, "Failed to remove partial compact index");
    }
}

/// Runs compaction on the blocking thread pool of the current process.
///
/// For embedders that do not need memory isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCompactor {
    options: CompactionOptions,
}

impl InlineCompactor {
    /// Creates an in-process compactor.
    #[must_use]
    pub const fn new(options: CompactionOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl CompactorPort for InlineCompactor {
    async fn compact(&self, raw: &Path, compact_path: &Path) -> Result<CompactionStats, CompactionError> {
        let raw = raw.to_path_buf();
        let compact_path = compact_path.to_path_buf();
        let options = self.options;

        tokio::task::spawn_blocking(move || compact_file(&raw, &compact_path, &options))
            .await
            .map_err(|e| CompactionError::worker(format!("Compaction task panicked: {e}")))?
    }
}
