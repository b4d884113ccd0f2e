pub mod corpus;
pub mod deliver;
pub mod history;

// Re-export command functions for convenience
pub use corpus::{split, stats, validate};
pub use deliver::{pick, today};
pub use history::{history_clear, history_show};

use anyhow::{Context, Result};
use std::path::Path;

use yomi::config::Config;
use yomi::corpus::{CorpusIndex, CorpusLoader, LoadReport};
use yomi::history::HistoryLedger;

/// Load configuration from a file, or from the environment when no file is given
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub(crate) fn load_corpus(config: &Config) -> Result<(CorpusIndex, LoadReport)> {
    let loader = CorpusLoader::from_config(&config.corpus);
    let loaded = loader
        .load()
        .with_context(|| format!("Failed to load corpus from {}", loader.dir().display()))?;
    Ok(loaded)
}

pub(crate) fn open_ledger(config: &Config) -> Result<HistoryLedger> {
    HistoryLedger::open(&config.history).with_context(|| {
        format!(
            "Failed to open {} history at {}",
            config.history.backend,
            config.history.path.display()
        )
    })
}
