//! Fair-rotation selection
//!
//! An item is not repeated within its category until every item of that
//! category has been delivered at least once. When the category is
//! exhausted the pick falls back to the full set (a soft reset): the ledger
//! is left untouched, only this one selection ignores the exclusion set.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::corpus::CorpusIndex;
use crate::error::Result;
use crate::history::HistoryLedger;
use crate::models::{Category, Item};

/// Choose uniformly among `items` whose id is not excluded
///
/// Falls back to the full list when everything is excluded. Returns `None`
/// only for an empty list.
pub fn choose_fair<'a, R: Rng + ?Sized>(
    items: &'a [Item],
    exclude: &HashSet<String>,
    rng: &mut R,
) -> Option<&'a Item> {
    let available: Vec<&Item> = items
        .iter()
        .filter(|item| !exclude.contains(&item.id))
        .collect();

    if available.is_empty() {
        return items.choose(rng);
    }

    available.choose(rng).copied()
}

/// Selects items from the corpus, excluding what the ledger has recorded
#[derive(Debug, Clone, Copy)]
pub struct RotationSelector<'a> {
    corpus: &'a CorpusIndex,
    ledger: &'a HistoryLedger,
}

impl<'a> RotationSelector<'a> {
    pub fn new(corpus: &'a CorpusIndex, ledger: &'a HistoryLedger) -> Self {
        Self { corpus, ledger }
    }

    pub fn corpus(&self) -> &'a CorpusIndex {
        self.corpus
    }

    pub fn ledger(&self) -> &'a HistoryLedger {
        self.ledger
    }

    /// Pick an undelivered item from a category, truly at random
    pub fn pick(&self, category: Category) -> Result<Option<&'a Item>> {
        let mut rng = ChaCha8Rng::from_entropy();
        self.pick_with(category, &mut rng)
    }

    /// Pick with the exclusion set read from the ledger and a caller-supplied generator
    pub fn pick_with<R: Rng + ?Sized>(
        &self,
        category: Category,
        rng: &mut R,
    ) -> Result<Option<&'a Item>> {
        let exclude = self.ledger.delivered_ids(category)?;
        Ok(self.pick_excluding(category, &exclude, rng))
    }

    /// Pick with an explicit exclusion set
    pub fn pick_excluding<R: Rng + ?Sized>(
        &self,
        category: Category,
        exclude: &HashSet<String>,
        rng: &mut R,
    ) -> Option<&'a Item> {
        let items = self.corpus.items(category);

        if items.is_empty() {
            tracing::warn!(category = %category, "No items available");
            return None;
        }

        if items.iter().all(|item| exclude.contains(&item.id)) {
            tracing::info!(
                category = %category,
                items = items.len(),
                "Rotation cycle complete, selecting from full set"
            );
        }

        let picked = choose_fair(items, exclude, rng);
        if let Some(item) = picked {
            tracing::debug!(
                category = %category,
                item_id = %item.id,
                excluded = exclude.len(),
                "Item selected"
            );
        }
        picked
    }

    /// Any item from the whole corpus, ignoring history
    pub fn pick_any<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a Item> {
        let all: Vec<&'a Item> = self.corpus.all_items().collect();
        all.choose(rng).copied()
    }
}
