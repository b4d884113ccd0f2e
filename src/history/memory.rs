//! In-memory ledger store

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use super::LedgerStore;
use crate::models::{Category, DeliveryRecord};

/// Non-durable store backed by a vector
///
/// Useful for testing and dry runs without touching disk.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    records: RwLock<Vec<DeliveryRecord>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_records(records: Vec<DeliveryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(&self, record: &DeliveryRecord) -> Result<()> {
        self.records
            .write()
            .map_err(|_| anyhow!("ledger lock poisoned"))?
            .push(record.clone());
        Ok(())
    }

    fn query(&self, category: Category) -> Result<HashSet<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("ledger lock poisoned"))?;
        Ok(records
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.item_id.clone())
            .collect())
    }

    fn exists(&self, date: NaiveDate) -> Result<bool> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("ledger lock poisoned"))?;
        Ok(records.iter().any(|r| r.delivered_on == date))
    }

    fn exists_for(&self, category: Category, date: NaiveDate) -> Result<bool> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("ledger lock poisoned"))?;
        Ok(records
            .iter()
            .any(|r| r.category == category && r.delivered_on == date))
    }

    fn clear(&self) -> Result<()> {
        self.records
            .write()
            .map_err(|_| anyhow!("ledger lock poisoned"))?
            .clear();
        Ok(())
    }

    fn records(&self) -> Result<Vec<DeliveryRecord>> {
        Ok(self
            .records
            .read()
            .map_err(|_| anyhow!("ledger lock poisoned"))?
            .clone())
    }
}
