//! JSON-file ledger store
//!
//! The whole history lives in one human-editable file:
//!
//! ```json
//! { "sent": [ { "item_id": "r1", "category": "rabash", "delivered_on": "2024-01-15" } ] }
//! ```
//!
//! Each append rewrites the file through a temporary sibling and an atomic
//! rename. The in-memory view is only updated once the rename succeeded, so
//! a failed write leaves both the file and the view unchanged.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::LedgerStore;
use crate::models::{Category, DeliveryRecord};

/// On-disk shape, read side
#[derive(Debug, Default, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    sent: Vec<DeliveryRecord>,
}

/// Ledger persisted as a single JSON file
#[derive(Debug)]
pub struct JsonLedgerStore {
    path: PathBuf,
    records: Mutex<Vec<DeliveryRecord>>,
}

impl JsonLedgerStore {
    /// Open (or lazily create) the ledger file
    ///
    /// A missing file is an empty ledger. An unreadable or corrupt file is
    /// an error: starting over silently would throw away the rotation state.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let file = File::open(&path)
                .with_context(|| format!("Failed to open ledger file: {}", path.display()))?;
            let ledger: LedgerFile = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse ledger file: {}", path.display()))?;
            ledger.sent
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), count = records.len(), "JSON ledger loaded");

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, records: &[DeliveryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create ledger directory: {}", parent.display())
                })?;
            }
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let file = File::create(&temp_path)
            .with_context(|| format!("Failed to create ledger file: {}", temp_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(
            &mut writer,
            &LedgerFileRef { sent: records },
        )
        .context("Failed to serialize ledger")?;
        writer.flush().context("Failed to flush ledger")?;
        writer
            .get_ref()
            .sync_all()
            .context("Failed to sync ledger file")?;

        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename ledger file: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "JSON ledger saved");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<DeliveryRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("ledger lock poisoned"))
    }
}

/// On-disk shape, write side; borrows to avoid cloning the records
#[derive(Serialize)]
struct LedgerFileRef<'a> {
    sent: &'a [DeliveryRecord],
}

impl LedgerStore for JsonLedgerStore {
    fn append(&self, record: &DeliveryRecord) -> Result<()> {
        let mut records = self.lock()?;
        let mut updated = records.clone();
        updated.push(record.clone());
        self.write_file(&updated)?;
        *records = updated;
        Ok(())
    }

    fn query(&self, category: Category) -> Result<HashSet<String>> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.item_id.clone())
            .collect())
    }

    fn exists(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.lock()?.iter().any(|r| r.delivered_on == date))
    }

    fn exists_for(&self, category: Category, date: NaiveDate) -> Result<bool> {
        Ok(self
            .lock()?
            .iter()
            .any(|r| r.category == category && r.delivered_on == date))
    }

    fn clear(&self) -> Result<()> {
        let mut records = self.lock()?;
        self.write_file(&[])?;
        records.clear();
        Ok(())
    }

    fn records(&self) -> Result<Vec<DeliveryRecord>> {
        Ok(self.lock()?.clone())
    }
}
