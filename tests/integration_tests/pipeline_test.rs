//! Pipeline integration tests
//!
//! Tests the complete delivery flow:
//! 1. Load corpus files from disk
//! 2. Pick one item per category
//! 3. Assemble and send chunks
//! 4. Record deliveries in a persistent ledger

use std::collections::HashSet;

use chrono::Duration;
use yomi::config::HistoryBackend;
use yomi::corpus::CorpusLoader;
use yomi::delivery::{DailyRun, ItemStatus, RunStatus};
use yomi::history::HistoryLedger;
use yomi::models::Category;
use yomi::rotation::DateSeededSource;

use super::fixtures::{Workspace, BROKEN_FILE, MIXED_FILE, RABASH_FILE};
use crate::common::{date, RecordingTransport};

// ============================================================================
// Corpus Loading
// ============================================================================

#[test]
fn test_load_valid_and_legacy_files() {
    let ws = Workspace::new();
    let (corpus, report) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();

    assert!(report.is_clean(), "unexpected rejects: {:?}", report.rejected);
    assert_eq!(report.files, 2);
    assert_eq!(corpus.items(Category::Rabash).len(), 3);
    assert_eq!(corpus.items(Category::BaalHasulam).len(), 2);

    let legacy = corpus.get(Category::BaalHasulam, "bh-001").unwrap();
    assert_eq!(legacy.book.as_deref(), Some("מתן תורה"));
    assert_eq!(legacy.section.as_deref(), Some("אות ג"));
    assert_eq!(
        corpus.get(Category::BaalHasulam, "bh-002").unwrap().author.as_deref(),
        Some("בעל הסולם")
    );
}

#[test]
fn test_bad_records_rejected_individually() {
    let ws = Workspace::with_files(&[
        ("a_mixed.json", MIXED_FILE),
        ("b_broken.json", BROKEN_FILE),
        ("c_rabash.json", RABASH_FILE),
    ]);
    let (corpus, report) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();

    let arizal: Vec<&str> = corpus
        .items(Category::Arizal)
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(arizal, vec!["ari-001"]);
    assert_eq!(corpus.items(Category::Rabash).len(), 3);

    // Five bad records plus the unparsable file
    assert_eq!(report.rejected.len(), 6);
    assert!(report
        .rejected
        .iter()
        .any(|r| r.file == "b_broken.json" && r.id.is_none()));
}

#[test]
fn test_load_order_follows_file_names() {
    let ws = Workspace::with_files(&[
        ("2.json", r#"{"category": "rabash", "items": [{"id": "second", "text": "0123456789 second"}]}"#),
        ("1.json", r#"{"category": "rabash", "items": [{"id": "first", "text": "0123456789 first"}]}"#),
    ]);
    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();

    let ids: Vec<&str> = corpus.all_items().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

// ============================================================================
// Daily Delivery
// ============================================================================

#[test]
fn test_daily_run_delivers_and_persists() {
    let ws = Workspace::new();
    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    let transport = RecordingTransport::default();
    let day = date(2024, 9, 1);

    {
        let ledger = HistoryLedger::open(&ws.config.history).unwrap();
        let report = DailyRun::from_config(&ws.config, &corpus, &ledger, &transport)
            .run(day)
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        let categories: Vec<Category> = report.items.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![Category::BaalHasulam, Category::Rabash]);
        assert!(report.items.iter().all(|r| r.status == ItemStatus::Delivered));
    }

    assert!(ws.history_path().exists());

    // A fresh process sees the same history
    let ledger = HistoryLedger::open(&ws.config.history).unwrap();
    assert!(ledger.was_any_delivered_on(day).unwrap());
    assert_eq!(ledger.records().unwrap().len(), 2);

    let again = DailyRun::from_config(&ws.config, &corpus, &ledger, &transport)
        .run(day)
        .unwrap();
    assert_eq!(again.status, RunStatus::AlreadyDelivered);
}

#[test]
fn test_rotation_over_consecutive_days() {
    let ws = Workspace::with_files(&[("rabash.json", RABASH_FILE)]);
    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    let ledger = HistoryLedger::open(&ws.config.history).unwrap();
    let transport = RecordingTransport::default();

    let start = date(2024, 9, 1);
    let mut first_cycle = HashSet::new();
    for offset in 0..3 {
        let report = DailyRun::new(&corpus, &ledger, &transport)
            .with_source(Box::new(DateSeededSource))
            .run(start + Duration::days(offset))
            .unwrap();
        assert!(first_cycle.insert(report.items[0].item_id.clone()));
    }
    assert_eq!(first_cycle.len(), 3);

    // Fourth day: category exhausted, still delivers
    let report = DailyRun::new(&corpus, &ledger, &transport)
        .run(start + Duration::days(3))
        .unwrap();
    assert_eq!(report.delivered(), 1);
    assert_eq!(ledger.records().unwrap().len(), 4);
}

#[test]
fn test_sqlite_backend_pipeline() {
    let mut ws = Workspace::new();
    ws.config.history.backend = HistoryBackend::Sqlite;
    ws.config.history.path = ws.path().join("history.db");

    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    let transport = RecordingTransport::default();
    let day = date(2024, 10, 1);

    {
        let ledger = HistoryLedger::open(&ws.config.history).unwrap();
        DailyRun::from_config(&ws.config, &corpus, &ledger, &transport)
            .run(day)
            .unwrap();
    }

    let ledger = HistoryLedger::open(&ws.config.history).unwrap();
    assert!(ledger.was_any_delivered_on(day).unwrap());
    assert_eq!(ledger.delivered_counts().unwrap()[&Category::Rabash], 1);
}

#[test]
fn test_long_item_split_with_single_action() {
    let text = "אין עוד מלבדו. ".repeat(40);
    let file = format!(
        r#"{{"category": "rabash", "items": [{{"id": "long", "text": "{text}", "source_url": "https://example.org/long"}}]}}"#
    );
    let mut ws = Workspace::with_files(&[("long.json", file.as_str())]);
    ws.config.delivery.max_message_chars = 120;

    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    let ledger = HistoryLedger::in_memory();
    let transport = RecordingTransport::default();

    let report = DailyRun::from_config(&ws.config, &corpus, &ledger, &transport)
        .run(date(2024, 1, 1))
        .unwrap();
    assert!(report.items[0].chunks > 1);

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), report.items[0].chunks);
    for (chunk, action) in sent.iter() {
        assert!(chunk.char_count() <= 120);
        assert_eq!(action.is_some(), chunk.is_last());
    }
    assert_eq!(sent.last().unwrap().1.as_ref().unwrap().url, "https://example.org/long");
}
