//! Fair content rotation
//!
//! # Overview
//!
//! Each category is rotated independently. An item is only repeated once
//! every other item of its category has been delivered; at that point the
//! next pick draws from the full set again without touching the ledger.
//!
//! # Modules
//!
//! - [`selector`] - Exclusion-aware selection from one category
//! - [`daily`] - One pick per category for a date
//! - [`source`] - Random and date-seeded generator strategies
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use yomi::rotation::{DailyPicker, RotationMode, RotationSelector};
//!
//! let selector = RotationSelector::new(&corpus, &ledger);
//! let picker = DailyPicker::new(selector, RotationMode::DateSeeded.source());
//! let picks = picker.pick_for_date(today)?;
//!
//! for (category, item) in picks.iter() {
//!     println!("{category}: {}", item.id);
//! }
//! ```

pub mod daily;
pub mod selector;
pub mod source;

pub use daily::{DailyPicker, DailyPicks};
pub use selector::{choose_fair, RotationSelector};
pub use source::{
    date_seed, DateSeededSource, EntropySource, FixedSeedSource, RandomSource, RotationMode,
};
