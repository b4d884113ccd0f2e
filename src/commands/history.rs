use anyhow::Result;

use yomi::config::Config;

use super::open_ledger;

pub fn history_show(config: &Config, limit: Option<usize>) -> Result<()> {
    let ledger = open_ledger(config)?;
    let records = ledger.records()?;

    if records.is_empty() {
        println!("No deliveries recorded");
        return Ok(());
    }

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in &records[skip..] {
        println!(
            "{}  {:<18} {}",
            record.delivered_on,
            record.category.id(),
            record.item_id
        );
    }
    println!();
    println!("{} record(s) total", records.len());

    Ok(())
}

pub fn history_clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("Refusing to clear history without --yes");
    }

    let ledger = open_ledger(config)?;
    let count = ledger.records()?.len();
    ledger.clear()?;

    println!("Cleared {count} record(s)");
    Ok(())
}
