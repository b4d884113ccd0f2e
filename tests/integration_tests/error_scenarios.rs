//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Transport failures
//! 2. Ledger write failures
//! 3. Corrupt ledger files
//! 4. Message limits too small for the header
//! 5. Same-day retries after a partial run

use yomi::corpus::{CorpusIndex, CorpusLoader};
use yomi::delivery::{DailyRun, ItemStatus, RunStatus};
use yomi::error::{Error, ErrorCategory};
use yomi::history::HistoryLedger;
use yomi::message::AssemblyError;
use yomi::models::{Category, Item};

use super::fixtures::Workspace;
use crate::common::{
    create_corpus, create_test_item, date, FailingTransport, ReadOnlyStore, RecordingTransport,
};

// ============================================================================
// Transport Failures
// ============================================================================

#[test]
fn test_failed_send_is_not_recorded() {
    let corpus = create_corpus(&[Category::Rabash, Category::Arizal], 3);
    let ledger = HistoryLedger::in_memory();
    let transport = FailingTransport::for_categories(&[Category::Rabash]);

    let report = DailyRun::new(&corpus, &ledger, &transport)
        .run(date(2024, 2, 1))
        .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.delivered(), 1);
    assert!(!report.is_success());

    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].category, Category::Rabash);
    assert!(matches!(&failed[0].status, ItemStatus::Failed(reason) if reason.contains("chat not found")));

    // Only the successful category was recorded
    assert!(ledger.delivered_ids(Category::Rabash).unwrap().is_empty());
    assert_eq!(ledger.delivered_ids(Category::Arizal).unwrap().len(), 1);

    let err = report.first_failure().unwrap();
    assert_eq!(err.category(), ErrorCategory::Delivery);
    assert!(err.is_recoverable());
}

// ============================================================================
// Ledger Failures
// ============================================================================

#[test]
fn test_ledger_write_failure_is_hard_error() {
    let corpus = create_corpus(&[Category::Rabash], 2);
    let ledger = HistoryLedger::new(ReadOnlyStore);
    let transport = RecordingTransport::default();

    let result = DailyRun::new(&corpus, &ledger, &transport).run(date(2024, 2, 1));

    match result {
        Err(Error::Ledger { operation, reason }) => {
            assert_eq!(operation, "append");
            assert!(reason.contains("disk full"));
        }
        other => panic!("expected ledger error, got {other:?}"),
    }

    // The chunk went out before the failed write
    assert_eq!(transport.sent.lock().unwrap().len(), 1);
}

#[test]
fn test_ledger_failure_in_dry_run_is_harmless() {
    let corpus = create_corpus(&[Category::Rabash], 2);
    let ledger = HistoryLedger::new(ReadOnlyStore);
    let transport = RecordingTransport::default();

    let report = DailyRun::new(&corpus, &ledger, &transport)
        .dry_run(true)
        .run(date(2024, 2, 1))
        .unwrap();
    assert_eq!(report.items[0].status, ItemStatus::Previewed);
}

#[test]
fn test_corrupt_json_ledger_refuses_to_open() {
    let ws = Workspace::new();
    let path = ws.history_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"sent\": [ {\"item_id\": ").unwrap();

    let err = HistoryLedger::open(&ws.config.history).unwrap_err();
    assert!(matches!(err, Error::Ledger { operation: "open", .. }));

    // The file is left untouched for inspection
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\"sent\": [ {\"item_id\": "
    );
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_limit_below_header_fails_fast() {
    let ws = Workspace::new();
    let (corpus, _) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    let ledger = HistoryLedger::in_memory();
    let transport = RecordingTransport::default();

    let result = DailyRun::new(&corpus, &ledger, &transport)
        .with_max_chars(5)
        .run(date(2024, 2, 1));

    assert!(matches!(
        result,
        Err(Error::Assembly(AssemblyError::HeaderTooLong { max_chars: 5, .. }))
    ));
    assert!(transport.sent.lock().unwrap().is_empty());
    assert!(ledger.records().unwrap().is_empty());
}

#[test]
fn test_missing_corpus_dir_sends_nothing() {
    let mut ws = Workspace::new();
    ws.config.corpus.dir = ws.path().join("does-not-exist");

    let (corpus, report) = CorpusLoader::from_config(&ws.config.corpus).load().unwrap();
    assert!(corpus.is_empty());
    assert_eq!(report.files, 0);

    let ledger = HistoryLedger::in_memory();
    let transport = RecordingTransport::default();
    let run = DailyRun::new(&corpus, &ledger, &transport)
        .run(date(2024, 2, 1))
        .unwrap();
    assert_eq!(run.status, RunStatus::NothingToSend);
}

// ============================================================================
// Same-Day Retries
// ============================================================================

#[test]
fn test_retry_sends_only_failed_category() {
    let corpus = create_corpus(&[Category::Arizal, Category::Rabash], 3);
    let ledger = HistoryLedger::in_memory();
    let day = date(2024, 2, 1);

    let first = DailyRun::new(&corpus, &ledger, &FailingTransport::for_categories(&[Category::Rabash]))
        .run(day)
        .unwrap();
    assert_eq!(first.delivered(), 1);
    assert_eq!(first.failed().count(), 1);

    let transport = RecordingTransport::default();
    let retry = DailyRun::new(&corpus, &ledger, &transport).run(day).unwrap();

    assert_eq!(retry.status, RunStatus::Completed);
    assert_eq!(retry.items.len(), 1);
    assert_eq!(retry.items[0].category, Category::Rabash);
    assert_eq!(retry.items[0].status, ItemStatus::Delivered);

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.text.starts_with(Category::Rabash.emoji()));
    drop(sent);

    // One record per category, and a third run has nothing left to do
    assert_eq!(ledger.delivered_ids(Category::Arizal).unwrap().len(), 1);
    assert_eq!(ledger.delivered_ids(Category::Rabash).unwrap().len(), 1);
    let third = DailyRun::new(&corpus, &ledger, &transport).run(day).unwrap();
    assert_eq!(third.status, RunStatus::AlreadyDelivered);
}

#[test]
fn test_oversized_header_sends_nothing_and_retry_delivers_all() {
    let corpus = CorpusIndex::from_items(vec![
        create_test_item("a1", Category::Arizal),
        Item::new("r1", Category::Rabash, "Text of a Rabash excerpt with a very long title.")
            .with_title("כ".repeat(300)),
    ])
    .unwrap();
    let ledger = HistoryLedger::in_memory();
    let transport = RecordingTransport::default();
    let day = date(2024, 2, 1);

    let result = DailyRun::new(&corpus, &ledger, &transport)
        .with_max_chars(200)
        .run(day);

    assert!(matches!(
        result,
        Err(Error::Assembly(AssemblyError::HeaderTooLong { max_chars: 200, .. }))
    ));
    assert!(transport.sent.lock().unwrap().is_empty());
    assert!(ledger.records().unwrap().is_empty());

    let retry = DailyRun::new(&corpus, &ledger, &transport)
        .with_max_chars(4096)
        .run(day)
        .unwrap();
    assert_eq!(retry.status, RunStatus::Completed);
    assert_eq!(retry.delivered(), 2);
    assert_eq!(transport.sent.lock().unwrap().len(), 2);
}
