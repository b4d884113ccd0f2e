//! yomi - daily excerpt rotation engine
//!
//! Picks one excerpt per category each day without repeating an excerpt
//! until its whole category has been delivered, and splits long excerpts
//! into message-sized fragments.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Categories, items and delivery records
//! - [`corpus`] - Validated, per-category item index and its loader
//! - [`history`] - Append-only delivery ledger with pluggable storage
//! - [`rotation`] - Fair selection and per-date picking
//! - [`segment`] - Boundary-preferring text splitting
//! - [`message`] - Header, continuation markers and action placement
//! - [`delivery`] - Daily run orchestration over a transport
//!
//! # Example
//!
//! ```no_run
//! use yomi::config::Config;
//! use yomi::corpus::CorpusLoader;
//! use yomi::delivery::{DailyRun, StdoutTransport};
//! use yomi::history::HistoryLedger;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let (corpus, _report) = CorpusLoader::from_config(&config.corpus).load()?;
//!     let ledger = HistoryLedger::open(&config.history)?;
//!
//!     let transport = StdoutTransport;
//!     let report = DailyRun::from_config(&config, &corpus, &ledger, &transport)
//!         .run(chrono::Local::now().date_naive())?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod delivery;
pub mod error;
pub mod history;
pub mod message;
pub mod models;
pub mod rotation;
pub mod segment;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::corpus::{CorpusIndex, CorpusLoader};
    pub use crate::delivery::{DailyRun, RunReport, Transport};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::history::{HistoryLedger, LedgerStore};
    pub use crate::message::{Chunk, MessageAssembler, SourceAction};
    pub use crate::models::{Category, DeliveryRecord, Item};
    pub use crate::rotation::{DailyPicker, RotationMode, RotationSelector};
    pub use crate::segment::TextSegmenter;
}

// Direct re-exports for convenience
pub use models::{Category, DeliveryRecord, Item};
