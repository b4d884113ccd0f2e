//! Common test utilities

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use yomi::corpus::CorpusIndex;
use yomi::delivery::Transport;
use yomi::history::LedgerStore;
use yomi::message::{Chunk, SourceAction};
use yomi::models::{Category, DeliveryRecord, Item};

/// Create a test item with default values
pub fn create_test_item(id: &str, category: Category) -> Item {
    Item::new(id, category, format!("Text of excerpt {id}, long enough to pass validation."))
        .with_book("שמעתי")
        .with_section("א")
}

/// Corpus with `per_category` items in each listed category
#[allow(dead_code)]
pub fn create_corpus(categories: &[Category], per_category: usize) -> CorpusIndex {
    let items = categories.iter().flat_map(|&category| {
        (0..per_category).map(move |i| create_test_item(&format!("{}-{i}", category.id()), category))
    });
    CorpusIndex::from_items(items).unwrap()
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Write a corpus file into `dir`
#[allow(dead_code)]
pub fn write_corpus_file(dir: &Path, name: &str, json: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), json).unwrap();
}

/// Transport that keeps every fragment it was given
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(Chunk, Option<SourceAction>)>>,
}

impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, chunk: &Chunk, action: Option<&SourceAction>) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((chunk.clone(), action.cloned()));
        Ok(())
    }
}

/// Transport that rejects fragments of the listed categories
#[allow(dead_code)]
pub struct FailingTransport {
    pub fail_for: HashSet<Category>,
}

#[allow(dead_code)]
impl FailingTransport {
    pub fn for_categories(categories: &[Category]) -> Self {
        Self {
            fail_for: categories.iter().copied().collect(),
        }
    }
}

impl Transport for FailingTransport {
    fn name(&self) -> &str {
        "failing"
    }

    fn send(&self, chunk: &Chunk, _action: Option<&SourceAction>) -> anyhow::Result<()> {
        // Only first chunks carry the category header
        let failing = self
            .fail_for
            .iter()
            .any(|c| chunk.index == 1 && chunk.text.starts_with(c.emoji()));
        if failing {
            anyhow::bail!("chat not found");
        }
        Ok(())
    }
}

/// Ledger store whose writes always fail
#[derive(Default)]
#[allow(dead_code)]
pub struct ReadOnlyStore;

impl LedgerStore for ReadOnlyStore {
    fn append(&self, _record: &DeliveryRecord) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    fn query(&self, _category: Category) -> anyhow::Result<HashSet<String>> {
        Ok(HashSet::new())
    }

    fn exists(&self, _date: NaiveDate) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn exists_for(&self, _category: Category, _date: NaiveDate) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn clear(&self) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    fn records(&self) -> anyhow::Result<Vec<DeliveryRecord>> {
        Ok(Vec::new())
    }
}
