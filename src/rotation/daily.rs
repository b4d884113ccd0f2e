//! One pick per category for a calendar date

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::selector::RotationSelector;
use super::source::RandomSource;
use crate::error::Result;
use crate::models::{Category, Item};

/// The items chosen for one date, keyed by category in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPicks<'a> {
    pub date: NaiveDate,
    picks: BTreeMap<Category, &'a Item>,
}

impl<'a> DailyPicks<'a> {
    pub fn get(&self, category: Category) -> Option<&'a Item> {
        self.picks.get(&category).copied()
    }

    /// Picks in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &'a Item)> + '_ {
        self.picks.iter().map(|(c, item)| (*c, *item))
    }

    pub fn categories(&self) -> Vec<Category> {
        self.picks.keys().copied().collect()
    }

    /// Categories that produced no pick (empty corpus)
    pub fn missing(&self) -> Vec<Category> {
        Category::all()
            .into_iter()
            .filter(|c| !self.picks.contains_key(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Total estimated reading time in minutes
    pub fn total_reading_minutes(&self) -> f64 {
        self.picks
            .values()
            .map(|item| item.estimated_reading_minutes())
            .sum()
    }
}

/// Picks one item per category for a date
///
/// Categories are processed in declaration order. The [`RandomSource`]
/// only decides among the items still available under fair rotation, so a
/// date-seeded source returns identical picks for repeated calls on the
/// same date as long as the ledger has not changed.
pub struct DailyPicker<'a> {
    selector: RotationSelector<'a>,
    source: Box<dyn RandomSource>,
}

impl<'a> DailyPicker<'a> {
    pub fn new(selector: RotationSelector<'a>, source: Box<dyn RandomSource>) -> Self {
        Self { selector, source }
    }

    pub fn selector(&self) -> RotationSelector<'a> {
        self.selector
    }

    /// One item per non-empty category for `date`
    pub fn pick_for_date(&self, date: NaiveDate) -> Result<DailyPicks<'a>> {
        let mut picks = BTreeMap::new();

        for category in Category::all() {
            let mut rng = self.source.rng_for(date, category);
            match self.selector.pick_with(category, &mut rng)? {
                Some(item) => {
                    picks.insert(category, item);
                }
                None => {
                    tracing::warn!(category = %category, date = %date, "Missing pick for category");
                }
            }
        }

        let picks = DailyPicks { date, picks };
        tracing::info!(
            date = %date,
            picks = picks.len(),
            reading_minutes = picks.total_reading_minutes(),
            "Daily picks selected"
        );
        Ok(picks)
    }

    /// Pick for a single category on `date` with this picker's source
    pub fn pick_one(&self, date: NaiveDate, category: Category) -> Result<Option<&'a Item>> {
        let mut rng = self.source.rng_for(date, category);
        self.selector.pick_with(category, &mut rng)
    }
}
