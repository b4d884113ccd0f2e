//! Core data structures for yomi
//!
//! Items are loaded once, validated by [`crate::corpus::CorpusLoader`], and
//! never mutated afterwards. Delivery records are the unit of the history
//! ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::corpus::CorpusError;

// ============================================================================
// Category
// ============================================================================

/// Closed set of content categories
///
/// Declaration order is significant: it is the order in which categories
/// are listed, picked and delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// האר״י הקדוש
    Arizal,
    /// הבעל שם טוב
    BaalShemTov,
    /// חסידות פולין
    PolishChassidut,
    /// בעל הסולם
    BaalHasulam,
    /// הרב"ש
    Rabash,
    /// חסידי אשלג
    ChasdeiAshlag,
}

impl Category {
    /// Get all categories in declaration order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Arizal,
            Self::BaalShemTov,
            Self::PolishChassidut,
            Self::BaalHasulam,
            Self::Rabash,
            Self::ChasdeiAshlag,
        ]
    }

    /// Get category count
    pub fn count() -> usize {
        6
    }

    /// Stable identifier, also used as the serialized form
    pub fn id(&self) -> &'static str {
        match self {
            Self::Arizal => "arizal",
            Self::BaalShemTov => "baal_shem_tov",
            Self::PolishChassidut => "polish_chassidut",
            Self::BaalHasulam => "baal_hasulam",
            Self::Rabash => "rabash",
            Self::ChasdeiAshlag => "chasdei_ashlag",
        }
    }

    /// Hebrew display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Arizal => "האר״י הקדוש",
            Self::BaalShemTov => "הבעל שם טוב",
            Self::PolishChassidut => "חסידות פולין",
            Self::BaalHasulam => "בעל הסולם",
            Self::Rabash => "הרב\"ש",
            Self::ChasdeiAshlag => "חסידי אשלג",
        }
    }

    /// English display name
    pub fn english_name(&self) -> &'static str {
        match self {
            Self::Arizal => "The Holy Arizal",
            Self::BaalShemTov => "The Baal Shem Tov",
            Self::PolishChassidut => "Polish Chassidut",
            Self::BaalHasulam => "Baal HaSulam",
            Self::Rabash => "Rabash",
            Self::ChasdeiAshlag => "Chasdei Ashlag",
        }
    }

    /// Emoji shown in message headers
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Arizal => "🕯️",
            Self::BaalShemTov => "✨",
            Self::PolishChassidut => "🔥",
            Self::BaalHasulam => "📖",
            Self::Rabash => "💎",
            Self::ChasdeiAshlag => "🌱",
        }
    }

    /// Get numeric index (0-based, declaration order)
    pub fn index(&self) -> usize {
        match self {
            Self::Arizal => 0,
            Self::BaalShemTov => 1,
            Self::PolishChassidut => 2,
            Self::BaalHasulam => 3,
            Self::Rabash => 4,
            Self::ChasdeiAshlag => 5,
        }
    }

    /// Create from index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    /// Parse from a stable identifier (case-insensitive)
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().replace('-', "_").as_str() {
            "arizal" => Some(Self::Arizal),
            "baal_shem_tov" => Some(Self::BaalShemTov),
            "polish_chassidut" => Some(Self::PolishChassidut),
            "baal_hasulam" => Some(Self::BaalHasulam),
            "rabash" => Some(Self::Rabash),
            "chasdei_ashlag" => Some(Self::ChasdeiAshlag),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Category {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| CorpusError::UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// Item
// ============================================================================

/// A single deliverable excerpt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique within its category
    pub id: String,
    pub category: Category,
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    /// The specific rabbi quoted, when the category spans several
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub book: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Create an item with only the required fields set
    pub fn new(id: impl Into<String>, category: Category, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            text: text.into(),
            title: None,
            author: None,
            book: None,
            section: None,
            source_url: None,
            tags: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = Some(book.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Approximate word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Character count (Unicode scalar values)
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Estimated reading time in minutes (Hebrew ~150 words/min)
    pub fn estimated_reading_minutes(&self) -> f64 {
        (self.word_count() as f64 / 150.0 * 10.0).round() / 10.0
    }

    /// Name shown as the speaker in headers
    pub fn speaker(&self) -> &str {
        self.author
            .as_deref()
            .unwrap_or_else(|| self.category.display_name())
    }

    /// Human-readable source citation: "display name, book, section"
    pub fn citation(&self) -> String {
        let mut parts = vec![self.speaker().to_string()];
        parts.extend(self.book.iter().cloned());
        parts.extend(self.section.iter().cloned());
        parts.join(", ")
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(50).collect();
        if self.char_count() > 50 {
            write!(f, "Item({}): {}...", self.id, preview)
        } else {
            write!(f, "Item({}): {}", self.id, preview)
        }
    }
}

// ============================================================================
// Delivery Record
// ============================================================================

/// "Item X was delivered on date Y"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryRecord {
    #[serde(alias = "quote_id", alias = "maamar_id")]
    pub item_id: String,
    #[serde(alias = "source")]
    pub category: Category,
    #[serde(alias = "sent_date")]
    pub delivered_on: NaiveDate,
}

impl DeliveryRecord {
    pub fn new(item_id: impl Into<String>, category: Category, delivered_on: NaiveDate) -> Self {
        Self {
            item_id: item_id.into(),
            category,
            delivered_on,
        }
    }

    /// Create a record for an item
    pub fn for_item(item: &Item, delivered_on: NaiveDate) -> Self {
        Self::new(item.id.clone(), item.category, delivered_on)
    }
}

// ============================================================================
// On-disk corpus file
// ============================================================================

/// A corpus file as stored on disk
///
/// Records are kept as raw JSON so that one malformed record can be rejected
/// without discarding the rest of the file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemFile {
    /// Default category for items that do not name one
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "quotes", alias = "maamarim")]
    pub items: Vec<serde_json::Value>,
}

/// A single record as written in a corpus file, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub id: String,
    #[serde(default, alias = "source")]
    pub category: Option<String>,
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "source_rabbi")]
    pub author: Option<String>,
    #[serde(default, alias = "source_book")]
    pub book: Option<String>,
    #[serde(default, alias = "source_section", alias = "page")]
    pub section: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}
