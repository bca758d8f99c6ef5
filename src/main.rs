use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use vanced_watch::checker::UpdateChecker;
use vanced_watch::config::{
    DEFAULT_POLL_INTERVAL_SECS, LOG_FILE_NAME, STATE_FILE_NAME, WatchConfig,
};
use vanced_watch::fetch::HttpPageSource;
use vanced_watch::notify::{DiscordNotifier, LogNotifier, Notifier};
use vanced_watch::simulator::SimulatedSource;
use vanced_watch::state::AppStore;
use vanced_watch::{simulator, watch};

#[derive(Parser)]
#[command(name = "vanced-watch")]
#[command(version, about = "Update watcher for YouTube ReVanced and MicroG")]
struct Cli {
    /// Directory for state and log files (defaults to the XDG data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Discord webhook URL (overrides DISCORD_WEBHOOK_URL)
    #[arg(long, global = true)]
    webhook_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single check cycle and exit
    Check,

    /// Check for updates on a fixed interval (the default)
    Watch {
        /// Seconds between check cycles
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
        interval: u64,
    },

    /// Drive the checker against an in-process mock page
    Simulate {
        /// Initial YouTube ReVanced version on the mock page
        #[arg(long)]
        yt_version: Option<String>,

        /// Initial MicroG version on the mock page
        #[arg(long)]
        microg_version: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = cli.data_dir.unwrap_or_else(vanced_watch::config::data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    // Keep the non-blocking writer guard alive for the process lifetime
    let _log_guard = init_logging(&data_dir);

    let mut config = WatchConfig::from_env();
    config.state_path = data_dir.join(STATE_FILE_NAME);
    if cli.webhook_url.is_some() {
        config.webhook_url = cli.webhook_url;
    }

    let notifier: Box<dyn Notifier> = match &config.webhook_url {
        Some(url) => {
            info!("Notifying via Discord webhook");
            Box::new(DiscordNotifier::new(url))
        }
        None => {
            info!("No webhook configured, notifications go to the log only");
            Box::new(LogNotifier)
        }
    };

    let store = AppStore::load(&config.state_path);

    match cli.command {
        Some(Command::Check) => {
            let source = HttpPageSource::new(&config.source_url);
            let mut checker = UpdateChecker::new(source, store);
            watch::run_once(&mut checker, notifier.as_ref()).await;
        }
        Some(Command::Watch { interval }) => {
            let source = HttpPageSource::new(&config.source_url);
            let mut checker = UpdateChecker::new(source, store);
            watch::run_loop(
                &mut checker,
                notifier.as_ref(),
                Duration::from_secs(interval),
            )
            .await;
        }
        None => {
            let source = HttpPageSource::new(&config.source_url);
            let mut checker = UpdateChecker::new(source, store);
            watch::run_loop(&mut checker, notifier.as_ref(), config.poll_interval).await;
        }
        Some(Command::Simulate {
            yt_version,
            microg_version,
        }) => {
            info!("Starting in simulator mode");
            let source = SimulatedSource::new();
            let mut checker = UpdateChecker::new(source.clone(), store);
            simulator::run(source, &mut checker, yt_version, microg_version)
                .await
                .context("simulator failed")?;
        }
    }

    Ok(())
}

/// Log to stderr and to a file in the data directory
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(data_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}
