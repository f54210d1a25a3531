//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::entities::EmptyEntryPolicy;
use crate::infrastructure::history_store::DEFAULT_HISTORY_LIMIT;
use crate::infrastructure::metadata::{
    DEFAULT_COMPACTION_TIMEOUT, DEFAULT_METADATA_URL, HttpSourceConfig,
};

const APP_NAME: &str = "emoji-kitchen";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "emoji-kitchen";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory holding the raw document, compact index and history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Location of the upstream metadata document.
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Seconds allowed to establish the download connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed between two reads of the download body.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Seconds a compaction worker may run before it is killed.
    #[serde(default = "default_compaction_timeout")]
    pub compaction_timeout_secs: u64,

    /// Whether base emojis without any combination stay in the index.
    #[serde(default)]
    pub empty_entries: EmptyEntryPolicy,

    /// Maximum number of mashups remembered.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_metadata_url() -> String {
    DEFAULT_METADATA_URL.to_string()
}

const fn default_connect_timeout() -> u64 {
    15
}

const fn default_read_timeout() -> u64 {
    60
}

const fn default_compaction_timeout() -> u64 {
    DEFAULT_COMPACTION_TIMEOUT.as_secs()
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = Some(data_dir.clone());
        }
        if let Some(metadata_url) = &args.metadata_url {
            self.metadata_url.clone_from(metadata_url);
        }
        if let Some(empty_entries) = args.empty_entries {
            self.empty_entries = empty_entries;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default data directory.
    #[must_use]
    pub fn default_data_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        Self::default_data_dir().map(|dir| dir.join("emoji-kitchen.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Returns effective data directory.
    #[must_use]
    pub fn effective_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(Self::default_data_dir)
    }

    /// Download settings derived from this configuration.
    #[must_use]
    pub fn http_source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            url: self.metadata_url.clone(),
            connect_timeout_secs: self.connect_timeout_secs,
            read_timeout_secs: self.read_timeout_secs,
        }
    }

    /// Limit for one compaction worker run.
    #[must_use]
    pub const fn compaction_timeout(&self) -> Duration {
        Duration::from_secs(self.compaction_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            data_dir: None,
            metadata_url: default_metadata_url(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            compaction_timeout_secs: default_compaction_timeout(),
            empty_entries: EmptyEntryPolicy::default(),
            history_limit: default_history_limit(),
        }
    }
}
