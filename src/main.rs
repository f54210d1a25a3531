use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use emoji_kitchen::application::CompactionOptions;
use emoji_kitchen::infrastructure::metadata::run_worker;
use emoji_kitchen::infrastructure::{AppConfig, CliArgs, Command, StorageManager};
use emoji_kitchen::presentation::App;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = match &args.config {
        Some(path) => StorageManager::with_dir(
            path.parent()
                .map(std::path::Path::to_path_buf)
                .unwrap_or_default(),
        ),
        None => StorageManager::new()?,
    };

    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();

    if let Command::CompactWorker { raw, compact } = &args.command {
        let options = CompactionOptions {
            empty_entries: args.empty_entries.unwrap_or_default(),
        };
        std::process::exit(run_worker(raw, compact, &options));
    }

    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = emoji_kitchen::VERSION, "Starting {}", emoji_kitchen::NAME);

    let app = App::new(&config)?;
    app.run(args.command).await
}
