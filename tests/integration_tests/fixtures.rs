//! Test fixtures for integration tests
//!
//! Provides sample corpus files and helpers to lay them out on disk

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use yomi::config::{Config, HistoryBackend};

use crate::common::write_corpus_file;

/// Three Rabash excerpts, one with a source link
pub const RABASH_FILE: &str = r#"
{
    "category": "rabash",
    "items": [
        {
            "id": "rabash-001",
            "text": "הכלל הוא שכל מה שהאדם עושה צריך להיות על מנת להשפיע.",
            "book": "שלבי הסולם",
            "section": "מאמר א",
            "source_url": "https://example.org/rabash/1"
        },
        {
            "id": "rabash-002",
            "text": "העיקר הוא האמונה למעלה מהדעת, שאינה תלויה בשום תנאי.",
            "book": "שלבי הסולם"
        },
        {
            "id": "rabash-003",
            "text": "אין אור בלי כלי, והכלי הוא החסרון שאדם מרגיש.",
            "title": "אור וכלי"
        }
    ]
}
"#;

/// Legacy field names and a per-item category
pub const LEGACY_FILE: &str = r#"
{
    "quotes": [
        {
            "id": "bh-001",
            "source": "baal_hasulam",
            "text": "מטרת הבריאה היא להיטיב לנבראיו, וזהו רצונו יתברך.",
            "source_book": "מתן תורה",
            "source_section": "אות ג"
        },
        {
            "id": "bh-002",
            "category": "baal_hasulam",
            "text": "אהבת הבריות היא האמצעי להגיע לאהבת הבורא.",
            "source_rabbi": "בעל הסולם"
        }
    ]
}
"#;

/// One good record and several that must be rejected
pub const MIXED_FILE: &str = r#"
{
    "category": "arizal",
    "items": [
        { "id": "ari-001", "text": "בתחילה היה אור עליון פשוט ממלא כל המציאות." },
        { "id": "ari-002", "text": "קצר" },
        { "id": "", "text": "מזהה ריק אינו תקין כלל וכלל." },
        { "id": "ari-003", "text": "קישור לא תקין למקור הטקסט.", "source_url": "ftp://example.org" },
        { "id": "ari-001", "text": "כפילות של מזהה באותה קטגוריה." },
        { "text": "חסר מזהה לגמרי ברשומה הזאת." }
    ]
}
"#;

/// A file that is not JSON at all
pub const BROKEN_FILE: &str = "{ \"items\": [ oops";

/// A corpus directory plus configuration pointing at it
pub struct Workspace {
    pub dir: TempDir,
    pub config: Config,
}

impl Workspace {
    /// Corpus with the Rabash and legacy files, JSON ledger
    pub fn new() -> Self {
        Self::with_files(&[("10_rabash.json", RABASH_FILE), ("20_legacy.json", LEGACY_FILE)])
    }

    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let corpus_dir = dir.path().join("items");
        for (name, content) in files {
            write_corpus_file(&corpus_dir, name, content);
        }

        let mut config = Config::default();
        config.corpus.dir = corpus_dir;
        config.history.backend = HistoryBackend::Json;
        config.history.path = dir.path().join("data").join("sent_history.json");

        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn history_path(&self) -> PathBuf {
        self.config.history.path.clone()
    }
}
