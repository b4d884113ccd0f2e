use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yomi::config::LoggingConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "yomi",
    version,
    about = "Daily excerpt rotation with fair repeats and message splitting",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deliver one excerpt per category for a date
    Today {
        /// Date to deliver for (YYYY-MM-DD); defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print the messages without recording them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Deliver even if the date was already delivered
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Pick a single excerpt
    Pick {
        /// Category id; any category when omitted (history is ignored)
        #[arg(short, long)]
        category: Option<String>,

        /// Record the pick in the history ledger
        #[arg(long, default_value = "false")]
        record: bool,
    },

    /// Split a text file into message-sized chunks
    Split {
        /// Input text file
        #[arg(short, long)]
        file: PathBuf,

        /// Characters per chunk; defaults to the configured message limit
        #[arg(short, long)]
        max_chars: Option<usize>,
    },

    /// Show corpus and rotation statistics
    Stats,

    /// Validate every corpus file and report rejected records
    Validate,

    /// Inspect or reset the delivery history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recorded deliveries, newest last
    Show {
        /// Show only the last N records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete every record; the next picks start a fresh rotation
    Clear {
        /// Confirm deletion
        #[arg(long, default_value = "false")]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let logging = config
        .logging
        .clone()
        .with_overrides(cli.log_format.as_deref(), cli.verbose);
    setup_tracing(&logging)?;

    tracing::debug!(
        corpus = %config.corpus.dir.display(),
        backend = %config.history.backend,
        mode = %config.rotation.mode,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Today {
            date,
            dry_run,
            force,
        } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            tracing::info!(date = %date, dry_run, force, "Starting today command");
            commands::today(&config, date, dry_run, force)?;
        }

        Commands::Pick { category, record } => {
            tracing::info!(category = ?category, record, "Starting pick command");
            commands::pick(&config, category.as_deref(), record)?;
        }

        Commands::Split { file, max_chars } => {
            commands::split(&config, &file, max_chars)?;
        }

        Commands::Stats => commands::stats(&config)?,

        Commands::Validate => commands::validate(&config)?,

        Commands::History { action } => match action {
            HistoryAction::Show { limit } => commands::history_show(&config, limit)?,
            HistoryAction::Clear { yes } => commands::history_clear(&config, yes)?,
        },
    }

    Ok(())
}

fn setup_tracing(logging: &LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(logging.filter_directive())
        .with_context(|| format!("Invalid log level '{}'", logging.level))?;

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        "text" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
        other => anyhow::bail!("Unknown log format '{other}'. Valid options: text, json"),
    }

    Ok(())
}
