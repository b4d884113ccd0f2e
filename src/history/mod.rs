//! Delivery history ledger
//!
//! The ledger is an append-only record of which item was delivered on which
//! date. It backs the fair-rotation exclusion set and the "already ran
//! today" check.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 HistoryLedger                   │
//! │  delivered_ids / record / was_any_delivered_on  │
//! └────────────────────────┬────────────────────────┘
//!                          │ LedgerStore
//!          ┌───────────────┼───────────────┐
//!          ▼               ▼               ▼
//!   ┌────────────┐  ┌────────────┐  ┌────────────┐
//!   │ JSON file  │  │   SQLite   │  │  Memory    │
//!   └────────────┘  └────────────┘  └────────────┘
//! ```
//!
//! Stores persist every append before returning. A failed write is an
//! error, never a silent drop: the caller must then treat the delivery as
//! unconfirmed.
//!
//! There is no locking across processes. Callers running overlapping
//! schedules must serialize themselves, e.g. via
//! [`HistoryLedger::was_delivered_on`].

pub mod json;
pub mod memory;
pub mod sqlite;

pub use json::JsonLedgerStore;
pub use memory::MemoryLedgerStore;
pub use sqlite::SqliteLedgerStore;

use std::collections::{BTreeMap, HashSet};

use anyhow::Result as StoreResult;
use chrono::NaiveDate;

use crate::config::{HistoryBackend, HistoryConfig};
use crate::error::{Error, Result};
use crate::models::{Category, DeliveryRecord, Item};

/// Storage backend for delivery records
///
/// Implementations use interior locking so that a single ledger can be
/// shared by reference between the selector and the delivery loop.
pub trait LedgerStore: Send + Sync {
    /// Durably append a record
    fn append(&self, record: &DeliveryRecord) -> StoreResult<()>;

    /// All item ids ever recorded for a category
    fn query(&self, category: Category) -> StoreResult<HashSet<String>>;

    /// Whether any record exists for the exact date
    fn exists(&self, date: NaiveDate) -> StoreResult<bool>;

    /// Whether a record exists for the category on the exact date
    fn exists_for(&self, category: Category, date: NaiveDate) -> StoreResult<bool>;

    /// Remove every record
    fn clear(&self) -> StoreResult<()>;

    /// All records in append order
    fn records(&self) -> StoreResult<Vec<DeliveryRecord>>;
}

/// Append-only delivery ledger over a pluggable store
pub struct HistoryLedger {
    store: Box<dyn LedgerStore>,
}

impl HistoryLedger {
    pub fn new(store: impl LedgerStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Non-durable ledger, for tests and dry runs
    pub fn in_memory() -> Self {
        Self::new(MemoryLedgerStore::new())
    }

    /// Open the backend selected in configuration
    pub fn open(config: &HistoryConfig) -> Result<Self> {
        let ledger = match config.backend {
            HistoryBackend::Json => Self::new(
                JsonLedgerStore::open(&config.path).map_err(|e| Error::ledger("open", e))?,
            ),
            HistoryBackend::Sqlite => Self::new(
                SqliteLedgerStore::open(&config.path).map_err(|e| Error::ledger("open", e))?,
            ),
            HistoryBackend::Memory => Self::in_memory(),
        };

        tracing::debug!(backend = ?config.backend, path = %config.path.display(), "History ledger opened");
        Ok(ledger)
    }

    /// Ids of every item ever delivered in a category
    pub fn delivered_ids(&self, category: Category) -> Result<HashSet<String>> {
        self.store
            .query(category)
            .map_err(|e| Error::ledger("query", e))
    }

    /// Record a delivery; persisted before this returns
    pub fn record(&self, item_id: &str, category: Category, date: NaiveDate) -> Result<()> {
        let record = DeliveryRecord::new(item_id, category, date);
        self.store
            .append(&record)
            .map_err(|e| Error::ledger("append", e))?;

        tracing::info!(item_id = %item_id, category = %category, date = %date, "Delivery recorded");
        Ok(())
    }

    /// Record delivery of an item
    pub fn record_item(&self, item: &Item, date: NaiveDate) -> Result<()> {
        self.record(&item.id, item.category, date)
    }

    /// Whether anything was delivered on the given date
    pub fn was_any_delivered_on(&self, date: NaiveDate) -> Result<bool> {
        self.store
            .exists(date)
            .map_err(|e| Error::ledger("exists", e))
    }

    /// Whether the category was delivered on the given date
    ///
    /// This is the per-category "already ran today" check: a run that failed
    /// part way can be repeated and only the missing categories go out.
    pub fn was_delivered_on(&self, category: Category, date: NaiveDate) -> Result<bool> {
        self.store
            .exists_for(category, date)
            .map_err(|e| Error::ledger("exists", e))
    }

    /// Empty the entire ledger
    ///
    /// Administrative only; the delivery flow never calls this.
    pub fn clear(&self) -> Result<()> {
        self.store.clear().map_err(|e| Error::ledger("clear", e))?;
        tracing::warn!("History ledger cleared");
        Ok(())
    }

    /// All records in append order
    pub fn records(&self) -> Result<Vec<DeliveryRecord>> {
        self.store
            .records()
            .map_err(|e| Error::ledger("records", e))
    }

    /// Number of distinct delivered ids per category
    pub fn delivered_counts(&self) -> Result<BTreeMap<Category, usize>> {
        Category::all()
            .into_iter()
            .map(|c| Ok((c, self.delivered_ids(c)?.len())))
            .collect()
    }
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLedger").finish_non_exhaustive()
    }
}
