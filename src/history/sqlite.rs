//! SQLite ledger store
//!
//! Uses `Mutex` to share one connection behind `&self`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

use super::LedgerStore;
use crate::models::{Category, DeliveryRecord};

/// Ledger persisted in a SQLite table
pub struct SqliteLedgerStore {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStore {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).context("Failed to open SQLite ledger")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite ledger initialized");
        Ok(store)
    }

    /// Create in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS deliveries (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    item_id TEXT NOT NULL,
                    category TEXT NOT NULL,
                    delivered_on TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_deliveries_category
                    ON deliveries(category);

                CREATE INDEX IF NOT EXISTS idx_deliveries_date
                    ON deliveries(delivered_on);
                "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("ledger lock poisoned"))
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl LedgerStore for SqliteLedgerStore {
    fn append(&self, record: &DeliveryRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO deliveries (item_id, category, delivered_on) VALUES (?1, ?2, ?3)",
            params![
                record.item_id,
                record.category.id(),
                date_key(record.delivered_on)
            ],
        )
        .context("Failed to insert delivery record")?;
        Ok(())
    }

    fn query(&self, category: Category) -> Result<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT item_id FROM deliveries WHERE category = ?1")
            .context("Failed to prepare category query")?;

        let ids = stmt
            .query_map(params![category.id()], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()
            .context("Failed to read delivered ids")?;

        Ok(ids)
    }

    fn exists(&self, date: NaiveDate) -> Result<bool> {
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM deliveries WHERE delivered_on = ?1)",
                params![date_key(date)],
                |row| row.get(0),
            )
            .context("Failed to check delivery date")?;

        Ok(exists)
    }

    fn exists_for(&self, category: Category, date: NaiveDate) -> Result<bool> {
        let conn = self.lock()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM deliveries WHERE category = ?1 AND delivered_on = ?2)",
                params![category.id(), date_key(date)],
                |row| row.get(0),
            )
            .context("Failed to check category delivery date")?;

        Ok(exists)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM deliveries", [])
            .context("Failed to clear deliveries")?;
        Ok(())
    }

    fn records(&self) -> Result<Vec<DeliveryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT item_id, category, delivered_on FROM deliveries ORDER BY seq")
            .context("Failed to prepare records query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read delivery records")?;

        rows.into_iter()
            .map(|(item_id, category, delivered_on)| {
                let category = Category::from_id(&category)
                    .ok_or_else(|| anyhow!("Unknown category in ledger: '{category}'"))?;
                let delivered_on = delivered_on
                    .parse::<NaiveDate>()
                    .with_context(|| format!("Invalid date in ledger: '{delivered_on}'"))?;
                Ok(DeliveryRecord {
                    item_id,
                    category,
                    delivered_on,
                })
            })
            .collect()
    }
}
