//! Command-line front end.

use std::io::Write;
use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::{info, warn};

use crate::application::services::compaction::CompactionOptions;
use crate::application::services::lookup::EmojiKitchen;
use crate::application::use_cases::{EnsureMetadataUseCase, FileStatus};
use crate::domain::entities::MetadataPaths;
use crate::domain::errors::IndexError;
use crate::domain::ports::ProgressCallback;
use crate::infrastructure::config::{AppConfig, Command};
use crate::infrastructure::history_store::HistoryStore;
use crate::infrastructure::metadata::{HttpMetadataSource, IndexLoader, ProcessCompactor};
use crate::infrastructure::search::EmojiSearchProvider;

/// Runs one CLI command against the local emoji data.
pub struct App {
    acquisition: EnsureMetadataUseCase,
    loader: IndexLoader,
    history: HistoryStore,
    show_progress: bool,
}

impl App {
    /// Wires the HTTP source, the worker-process compactor and the stores
    /// from `config`.
    ///
    /// # Errors
    /// Returns error if no data directory can be determined or the HTTP
    /// client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let data_dir = config
            .effective_data_dir()
            .ok_or_else(|| eyre!("Could not determine a data directory, pass --data-dir"))?;
        let paths = MetadataPaths::new(data_dir);

        let source = HttpMetadataSource::new(config.http_source_config())
            .wrap_err("Failed to create HTTP client")?;
        let compactor = ProcessCompactor::current_exe(
            CompactionOptions {
                empty_entries: config.empty_entries,
            },
            config.compaction_timeout(),
        )?;

        let loader = IndexLoader::new(paths.compact());
        let history = HistoryStore::new(paths.history(), config.history_limit);
        let acquisition = EnsureMetadataUseCase::new(paths, Arc::new(source), Arc::new(compactor));

        Ok(Self::with_parts(acquisition, loader, history))
    }

    /// Builds an app from already constructed parts.
    #[must_use]
    pub fn with_parts(
        acquisition: EnsureMetadataUseCase,
        loader: IndexLoader,
        history: HistoryStore,
    ) -> Self {
        Self {
            acquisition,
            loader,
            history,
            show_progress: true,
        }
    }

    /// Turns the stderr progress lines on or off.
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Runs `command`, writing results to stdout.
    ///
    /// # Errors
    /// Returns error if the command fails.
    pub async fn run(&self, command: Command) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with(command, &mut out).await
    }

    /// Runs `command`, writing results to `out`.
    ///
    /// # Errors
    /// Returns error if the command fails.
    pub async fn run_with<W: Write>(&self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Setup => {
                let kitchen = self.kitchen().await?;
                writeln!(
                    out,
                    "Emoji data ready: {} base emojis, {} combinations",
                    kitchen.index().len(),
                    kitchen.index().combination_count()
                )?;
            }
            Command::Refresh => {
                self.acquisition
                    .refresh(self.progress())
                    .await
                    .wrap_err("Failed to refresh emoji data")?;
                let index = self.loader.reload()?;
                writeln!(
                    out,
                    "Emoji data refreshed: {} base emojis, {} combinations",
                    index.len(),
                    index.combination_count()
                )?;
            }
            Command::Status => self.print_status(out)?,
            Command::List => {
                for info in self.kitchen().await?.list_base_emojis() {
                    writeln!(out, "{}\t{}", info.emoji, info.name)?;
                }
            }
            Command::Combos { emoji } => {
                let partners = self.kitchen().await?.list_combinations(&emoji);
                if partners.is_empty() {
                    writeln!(out, "No combinations for {emoji}")?;
                }
                for info in partners {
                    writeln!(out, "{}\t{}", info.emoji, info.name)?;
                }
            }
            Command::Mix {
                left,
                right,
                no_history,
            } => {
                let kitchen = self.kitchen().await?;
                let Some(mashup) = kitchen.resolve_pair(&left, &right) else {
                    bail!("{left} and {right} do not combine");
                };
                writeln!(out, "{}", mashup.url)?;
                if !no_history {
                    self.remember(&mashup.left, &mashup.right, &mashup.url).await;
                }
            }
            Command::Random => {
                let kitchen = self.kitchen().await?;
                let mashup = kitchen
                    .random_pair(&mut rand::rng())
                    .and_then(|(left, right)| kitchen.resolve_pair(&left, &right))
                    .ok_or_else(|| eyre!("No emoji combinations available"))?;
                writeln!(out, "{} + {}", mashup.left, mashup.right)?;
                writeln!(out, "{}", mashup.url)?;
            }
            Command::Search { query, limit } => {
                let provider = EmojiSearchProvider::new(self.kitchen().await?.list_base_emojis());
                for hit in provider.search(&query, limit) {
                    writeln!(out, "{}\t{}", hit.info.emoji, hit.info.name)?;
                }
            }
            Command::History { clear, remove } => {
                if clear {
                    self.history.clear().await?;
                    writeln!(out, "History cleared")?;
                } else if let Some(timestamp) = remove {
                    if !self.history.remove(timestamp).await? {
                        bail!("No history entry with timestamp {timestamp}");
                    }
                    writeln!(out, "Removed {timestamp}")?;
                } else {
                    for item in self.history.list().await? {
                        let when = item
                            .created_at()
                            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_default();
                        writeln!(
                            out,
                            "{}\t{}\t{} + {}\t{}",
                            item.timestamp, when, item.left_emoji, item.right_emoji, item.mashup_url
                        )?;
                    }
                }
            }
            Command::CompactWorker { .. } => {
                bail!("compact-worker must be dispatched before the app starts");
            }
        }
        Ok(())
    }

    /// Makes sure emoji data exists and returns a facade over it.
    ///
    /// A corrupt compact index is removed by the loader; one more acquisition
    /// rebuilds it from the raw document.
    async fn kitchen(&self) -> Result<EmojiKitchen> {
        self.ensure().await?;
        match self.loader.get_index() {
            Ok(index) => Ok(EmojiKitchen::new(index)),
            Err(IndexError::Corrupt { message }) => {
                warn!(%message, "Rebuilding corrupt emoji index");
                self.ensure().await?;
                Ok(EmojiKitchen::new(self.loader.reload()?))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure(&self) -> Result<()> {
        self.acquisition
            .execute(self.progress())
            .await
            .wrap_err("Emoji data is not available")
    }

    async fn remember(&self, left: &str, right: &str, url: &str) {
        match self.history.append(left, right, url).await {
            Ok(item) => info!(timestamp = item.timestamp, "Mashup saved to history"),
            Err(e) => warn!(error = %e, "Failed to save mashup to history"),
        }
    }

    fn progress(&self) -> Option<ProgressCallback> {
        self.show_progress.then(progress_printer)
    }

    fn print_status<W: Write>(&self, out: &mut W) -> Result<()> {
        let status = self.acquisition.status();
        writeln!(out, "Data directory: {}", status.data_dir.display())?;
        writeln!(out, "Raw metadata:   {}", describe(&status.raw))?;
        writeln!(out, "Compact index:  {}", describe(&status.compact))?;
        if status.in_flight {
            writeln!(out, "Acquisition in progress")?;
        }
        Ok(())
    }
}

fn describe(file: &FileStatus) -> String {
    match file.size {
        Some(size) => format!("{} ({size} bytes)", file.path.display()),
        None => format!("{} (missing)", file.path.display()),
    }
}

/// Progress callback that prints status lines on stderr.
#[must_use]
pub fn progress_printer() -> ProgressCallback {
    Arc::new(|line: &str| eprintln!("{line}"))
}
