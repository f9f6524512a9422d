use clap::{Parser, Subcommand};
use jobscout_core::config::JobScoutConfig;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "jobscout", about = "Harvest, classify, and score job postings from group-chat channels")]
struct Cli {
    /// Path to a TOML config file. Falls back to JOBSCOUT_CONFIG, then
    /// the built-in defaults, the same precedence as JobScoutConfig::load.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape every channel with an assigned account.
    Batch {
        /// Run even outside the configured working-hours window.
        #[arg(long)]
        force: bool,
    },
    /// Classify, extract, and persist pending raw messages.
    Process {
        /// Maximum number of raw messages to walk in this invocation.
        #[arg(long, default_value_t = 500)]
        limit: usize,
    },
    /// Recompute channel health/relevance scores.
    ScoreChannels,
    /// Refit the classifier from a labeled JSONL corpus.
    Retrain {
        /// Path to a JSONL file of `{"text": ..., "is_job": ...}` rows.
        corpus: String,
        #[arg(long, default_value_t = 300)]
        epochs: usize,
        #[arg(long, default_value_t = 0.3)]
        learning_rate: f64,
    },
    /// Report consistency issues across the stores without changing anything.
    Verify,
    /// Run batch/process/score-channels on their own persisted schedule
    /// instead of one-shot, until interrupted.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "jobscout=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(|| std::env::var("JOBSCOUT_CONFIG").ok());
    let config = JobScoutConfig::load(config_path.as_deref())?;

    match cli.command {
        Command::Batch { force } => commands::batch::run(&config, force).await,
        Command::Process { limit } => commands::process::run(&config, limit),
        Command::ScoreChannels => commands::score_channels::run(&config),
        Command::Retrain { corpus, epochs, learning_rate } => {
            commands::retrain::run(&config, &corpus, epochs, learning_rate)
        }
        Command::Verify => commands::verify::run(&config),
        Command::Serve => commands::serve::run(&config).await,
    }
}
