//! In-memory corpus of validated items, grouped by category
//!
//! [`CorpusIndex`] is a pure lookup structure: it performs no I/O and never
//! changes after construction. Use [`CorpusLoader`] to build one from a
//! directory of JSON files; to pick up edits, load a fresh index and replace
//! the old one.

pub mod loader;

pub use loader::{CorpusLoader, LoadReport, RejectedRecord};

use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::models::{Category, Item};

/// Errors raised while building a corpus
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),

    #[error("Duplicate item id '{id}' in category {category}")]
    DuplicateId { id: String, category: Category },

    #[error("Invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },
}

/// Item counts per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub total: usize,
    pub per_category: BTreeMap<Category, usize>,
}

impl CorpusStats {
    /// Categories with no items at all
    pub fn empty_categories(&self) -> Vec<Category> {
        Category::all()
            .into_iter()
            .filter(|c| self.per_category.get(c).copied().unwrap_or(0) == 0)
            .collect()
    }
}

/// Ordered, per-category index of items
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    items: BTreeMap<Category, Vec<Item>>,
}

impl CorpusIndex {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from already-validated items, keeping their order
    ///
    /// Only the uniqueness of ids within a category is checked here; content
    /// validation is the loader's job.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self, CorpusError> {
        let mut index = Self::new();
        let mut seen: HashSet<(Category, String)> = HashSet::new();

        for item in items {
            if !seen.insert((item.category, item.id.clone())) {
                return Err(CorpusError::DuplicateId {
                    id: item.id,
                    category: item.category,
                });
            }
            index.items.entry(item.category).or_default().push(item);
        }

        Ok(index)
    }

    /// All items of one category in load order (empty if none)
    pub fn items(&self, category: Category) -> &[Item] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All items, categories in declaration order, items in load order
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.items.values().flatten()
    }

    /// Look up an item by category and id
    pub fn get(&self, category: Category, id: &str) -> Option<&Item> {
        self.items(category).iter().find(|item| item.id == id)
    }

    /// Look up an item by id across all categories
    pub fn find(&self, id: &str) -> Option<&Item> {
        self.all_items().find(|item| item.id == id)
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item counts per category, every category listed
    pub fn stats(&self) -> CorpusStats {
        let per_category: BTreeMap<Category, usize> = Category::all()
            .into_iter()
            .map(|c| (c, self.items(c).len()))
            .collect();

        CorpusStats {
            total: self.len(),
            per_category,
        }
    }
}
