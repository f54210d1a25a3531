use super::app_config::LogLevel;
use crate::domain::entities::EmptyEntryPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "emoji-kitchen",
    version,
    about = "Browse and combine Emoji Kitchen mashups from the terminal",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Directory for downloaded and compacted emoji data.
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// URL of the upstream metadata document.
    #[arg(long, value_name = "URL", global = true)]
    pub metadata_url: Option<String>,

    /// Keep or drop base emojis without combinations (keep, drop).
    #[arg(long, value_name = "POLICY", global = true)]
    pub empty_entries: Option<EmptyEntryPolicy>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Download and prepare emoji data if it is missing.
    Setup,
    /// Delete local emoji data and prepare it again.
    Refresh,
    /// Show where emoji data lives and whether it is ready.
    Status,
    /// List every base emoji.
    List,
    /// List the emojis that combine with EMOJI.
    Combos {
        /// Base emoji.
        emoji: String,
    },
    /// Resolve the mashup image for two emojis.
    Mix {
        /// First emoji.
        left: String,
        /// Second emoji.
        right: String,
        /// Do not record the result in history.
        #[arg(long)]
        no_history: bool,
    },
    /// Pick a random valid pair.
    Random,
    /// Find base emojis by name.
    Search {
        /// Name or emoji to look for.
        query: String,
        /// Maximum number of results.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show or edit mashup history.
    History {
        /// Delete every entry.
        #[arg(long, conflicts_with = "remove")]
        clear: bool,
        /// Delete the entry with this timestamp.
        #[arg(long, value_name = "TIMESTAMP")]
        remove: Option<i64>,
    },
    /// Compact a raw metadata document (internal).
    #[command(name = "compact-worker", hide = true)]
    CompactWorker {
        /// Raw metadata document.
        raw: PathBuf,
        /// Compact index to write.
        compact: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mix() {
        let args = CliArgs::parse_from(["emoji-kitchen", "mix", "😀", "🐱", "--no-history"]);

        assert_eq!(
            args.command,
            Command::Mix {
                left: "😀".to_string(),
                right: "🐱".to_string(),
                no_history: true,
            }
        );
    }

    #[test]
    fn test_parse_worker_with_policy() {
        let args = CliArgs::parse_from([
            "emoji-kitchen",
            "compact-worker",
            "--empty-entries",
            "drop",
            "/data/raw.json",
            "/data/out.json",
        ]);

        assert_eq!(args.empty_entries, Some(EmptyEntryPolicy::Drop));
        assert!(matches!(args.command, Command::CompactWorker { .. }));
    }

    #[test]
    fn test_history_flags_conflict() {
        let result =
            CliArgs::try_parse_from(["emoji-kitchen", "history", "--clear", "--remove", "5"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result =
            CliArgs::try_parse_from(["emoji-kitchen", "--empty-entries", "maybe", "list"]);

        assert!(result.is_err());
    }
}
