use anyhow::Result;
use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use yomi::config::Config;
use yomi::delivery::{DailyRun, StdoutTransport};
use yomi::models::{Category, Item};
use yomi::rotation::{DailyPicker, RotationSelector};

use super::{load_corpus, open_ledger};

pub fn today(config: &Config, date: NaiveDate, dry_run: bool, force: bool) -> Result<()> {
    let (corpus, _) = load_corpus(config)?;
    let ledger = open_ledger(config)?;
    let transport = StdoutTransport;

    let report = DailyRun::from_config(config, &corpus, &ledger, &transport)
        .dry_run(dry_run || config.delivery.dry_run)
        .force(force)
        .run(date)?;

    println!("{report}");

    if let Some(err) = report.first_failure() {
        return Err(err.into());
    }
    Ok(())
}

pub fn pick(config: &Config, category: Option<&str>, record: bool) -> Result<()> {
    let (corpus, _) = load_corpus(config)?;
    let ledger = open_ledger(config)?;
    let selector = RotationSelector::new(&corpus, &ledger);
    let today = chrono::Local::now().date_naive();

    let Some(category) = category else {
        let mut rng = ChaCha8Rng::from_entropy();
        match selector.pick_any(&mut rng) {
            Some(item) => print_item(item),
            None => println!("Corpus is empty"),
        }
        if record {
            println!("(--record is ignored without --category)");
        }
        return Ok(());
    };

    let category: Category = category.parse()?;
    let picker = DailyPicker::new(selector, config.rotation.mode.source());

    let Some(item) = picker.pick_one(today, category)? else {
        println!("No items in category {category}");
        return Ok(());
    };

    print_item(item);

    if record {
        ledger.record_item(item, today)?;
        println!("Recorded {} as delivered on {today}", item.id);
    }

    Ok(())
}

fn print_item(item: &Item) {
    println!("{} {} [{}]", item.category.emoji(), item.citation(), item.id);
    if let Some(title) = &item.title {
        println!("{title}");
    }
    println!();
    println!("{}", item.text);
    if let Some(url) = &item.source_url {
        println!();
        println!("{url}");
    }
    println!();
    println!(
        "{} words, ~{} min",
        item.word_count(),
        item.estimated_reading_minutes()
    );
}
