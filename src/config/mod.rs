//! Configuration management for yomi
//!
//! Configuration is loaded from a TOML file, from `YOMI_*` environment
//! variables, or falls back to defaults. Every section may be omitted from
//! the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::rotation::RotationMode;

/// Smallest message limit that leaves room for a header and some text
pub const MIN_MESSAGE_CHARS: usize = 64;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Corpus location and validation
    pub corpus: CorpusConfig,

    /// Delivery history storage
    pub history: HistoryConfig,

    /// Rotation randomness
    pub rotation: RotationConfig,

    /// Message limits and labels
    pub delivery: DeliveryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory of JSON corpus files
    pub dir: PathBuf,

    /// Minimum text length after trimming
    pub min_text_chars: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/items"),
            min_text_chars: 10,
        }
    }
}

/// Ledger storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Json,
    Sqlite,
    /// Nothing is persisted
    Memory,
}

impl HistoryBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for HistoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HistoryBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!(
                "Unknown history backend '{other}'. Valid options: json, sqlite, memory"
            ),
        }
    }
}

/// History ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,

    /// Ledger file (JSON) or database (SQLite); unused for memory
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::Json,
            path: PathBuf::from("data/sent_history.json"),
        }
    }
}

/// Rotation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub mode: RotationMode,
}

/// Delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Maximum characters per message fragment
    pub max_message_chars: usize,

    /// Label of the "part i/n" marker
    pub continuation_label: String,

    /// Label of the source link action
    pub action_label: String,

    /// Send through the transport but never record
    pub dry_run: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_message_chars: 4096,
            continuation_label: crate::message::DEFAULT_CONTINUATION_LABEL.to_string(),
            action_label: crate::message::DEFAULT_ACTION_LABEL.to_string(),
            dry_run: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl LoggingConfig {
    /// Apply command-line overrides
    ///
    /// A given format replaces the configured one; `verbose` raises the
    /// level to `debug` unless it is already `trace`.
    pub fn with_overrides(mut self, format: Option<&str>, verbose: bool) -> Self {
        if let Some(format) = format {
            self.format = format.to_string();
        }
        if verbose && !self.level.eq_ignore_ascii_case("trace") {
            self.level = String::from("debug");
        }
        self
    }

    /// `EnvFilter` directive: this crate at the configured level, dependencies at `warn`
    pub fn filter_directive(&self) -> String {
        format!("yomi={},warn", self.level.to_lowercase())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let corpus_dir = std::env::var("YOMI_CORPUS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.corpus.dir);

        let min_text_chars =
            env_parse("YOMI_MIN_TEXT_CHARS").unwrap_or(defaults.corpus.min_text_chars);

        let backend = match std::env::var("YOMI_HISTORY_BACKEND") {
            Ok(v) => v.parse::<HistoryBackend>()?,
            Err(_) => defaults.history.backend,
        };

        let history_path = std::env::var("YOMI_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.history.path);

        let mode = match std::env::var("YOMI_ROTATION_MODE") {
            Ok(v) => v
                .parse::<RotationMode>()
                .context("Invalid YOMI_ROTATION_MODE")?,
            Err(_) => defaults.rotation.mode,
        };

        let max_message_chars =
            env_parse("YOMI_MAX_MESSAGE_CHARS").unwrap_or(defaults.delivery.max_message_chars);

        let continuation_label = std::env::var("YOMI_CONTINUATION_LABEL")
            .unwrap_or(defaults.delivery.continuation_label);

        let action_label =
            std::env::var("YOMI_ACTION_LABEL").unwrap_or(defaults.delivery.action_label);

        let dry_run = env_parse("YOMI_DRY_RUN").unwrap_or(false);

        let log_level = std::env::var("YOMI_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let log_format = std::env::var("YOMI_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            corpus: CorpusConfig {
                dir: corpus_dir,
                min_text_chars,
            },
            history: HistoryConfig {
                backend,
                path: history_path,
            },
            rotation: RotationConfig { mode },
            delivery: DeliveryConfig {
                max_message_chars,
                continuation_label,
                action_label,
                dry_run,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.delivery.max_message_chars < MIN_MESSAGE_CHARS {
            anyhow::bail!(
                "max_message_chars must be at least {MIN_MESSAGE_CHARS} (got {})",
                self.delivery.max_message_chars
            );
        }

        if self.corpus.min_text_chars == 0 {
            anyhow::bail!("min_text_chars must be greater than 0");
        }

        if self.history.backend != HistoryBackend::Memory
            && self.history.path.as_os_str().is_empty()
        {
            anyhow::bail!("history.path must be set for the {} backend", self.history.backend);
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            anyhow::bail!("Unknown log level '{}'", self.logging.level);
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("Unknown log format '{}'", self.logging.format);
        }

        Ok(())
    }
}
