use anyhow::{Context, Result};
use std::path::Path;

use yomi::config::Config;
use yomi::models::Category;
use yomi::segment::{char_len, TextSegmenter};

use super::{load_corpus, open_ledger};

pub fn stats(config: &Config) -> Result<()> {
    let (corpus, report) = load_corpus(config)?;
    let ledger = open_ledger(config)?;

    let stats = corpus.stats();
    let delivered = ledger.delivered_counts()?;

    println!("Corpus Statistics");
    println!("=================");
    println!("Directory: {}", config.corpus.dir.display());
    println!("Files: {}", report.files);
    println!();
    println!(
        "{:<20} {:<20} {:>8} {:>10} {:>10}",
        "Category", "Name", "Items", "Delivered", "Remaining"
    );

    for category in Category::all() {
        let total = stats.per_category.get(&category).copied().unwrap_or(0);
        let sent = delivered.get(&category).copied().unwrap_or(0).min(total);
        println!(
            "{:<20} {:<20} {:>8} {:>10} {:>10}",
            category.id(),
            category.english_name(),
            total,
            sent,
            total - sent
        );
    }

    println!();
    println!("Total items: {}", stats.total);
    if !report.is_clean() {
        println!("Rejected records: {} (run `yomi validate`)", report.rejected.len());
    }

    let empty = stats.empty_categories();
    if !empty.is_empty() {
        let names: Vec<&str> = empty.iter().map(|c| c.id()).collect();
        println!("Empty categories: {}", names.join(", "));
    }

    Ok(())
}

pub fn validate(config: &Config) -> Result<()> {
    let (corpus, report) = load_corpus(config)?;

    println!("Validated {} file(s): {} item(s) loaded", report.files, report.loaded);

    if report.is_clean() {
        println!("All records valid");
        tracing::info!(items = corpus.len(), "Corpus valid");
        return Ok(());
    }

    println!("{} record(s) rejected:", report.rejected.len());
    for rejected in &report.rejected {
        match &rejected.id {
            Some(id) => println!("  {} [{id}]: {}", rejected.file, rejected.reason),
            None => println!("  {}: {}", rejected.file, rejected.reason),
        }
    }

    anyhow::bail!("{} corpus record(s) failed validation", report.rejected.len())
}

pub fn split(config: &Config, file: &Path, max_chars: Option<usize>) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let segmenter = TextSegmenter::new(max_chars.unwrap_or(config.delivery.max_message_chars))?;
    let chunks = segmenter.segment(&text);

    for (i, chunk) in chunks.iter().enumerate() {
        println!(
            "── chunk {}/{} ({} chars) ──",
            i + 1,
            chunks.len(),
            char_len(chunk)
        );
        println!("{chunk}");
    }

    Ok(())
}
