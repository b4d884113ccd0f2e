//! Daily delivery orchestration
//!
//! Ties the pieces together: pick one item per category, skip categories
//! the ledger already has for the date, assemble every remaining pick into
//! chunks, hand the chunks to a [`Transport`], and record every item whose
//! chunks were all accepted.
//!
//! # Failure handling
//!
//! - Assembly errors (a limit too small for a header) fail the run before
//!   any chunk is sent.
//! - A transport failure marks that item as failed in the [`RunReport`] and
//!   leaves it unrecorded. Re-running the same date sends only the
//!   categories that have no record for it.
//! - A ledger failure aborts the run with an error. The item may already
//!   have been sent; it is treated as unconfirmed and can be repeated.
//! - An empty pick set is reported as "nothing sent", not as an error.

use std::fmt;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::corpus::CorpusIndex;
use crate::error::{Error, Result};
use crate::history::HistoryLedger;
use crate::message::{Chunk, MessageAssembler, SourceAction};
use crate::models::{Category, Item};
use crate::rotation::{DailyPicker, EntropySource, RandomSource, RotationSelector};

/// Sends message fragments to readers
///
/// Implementations own rendering of the action (e.g. a link button),
/// network I/O, retries and rate limiting.
pub trait Transport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Send one fragment; `action` is only given for the fragment that carries it
    fn send(&self, chunk: &Chunk, action: Option<&SourceAction>) -> anyhow::Result<()>;
}

/// Prints fragments to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTransport;

impl Transport for StdoutTransport {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, chunk: &Chunk, action: Option<&SourceAction>) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "── [{}/{}] ──", chunk.index, chunk.total)?;
        writeln!(out, "{}", chunk.text)?;
        if let Some(action) = action {
            writeln!(out, "[{}] {}", action.label, action.url)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// What happened to one picked item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum ItemStatus {
    /// All chunks sent and the delivery recorded
    Delivered,
    /// All chunks sent; nothing recorded (dry run)
    Previewed,
    /// A chunk was rejected; nothing recorded
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub category: Category,
    pub item_id: String,
    pub chunks: usize,
    pub status: ItemStatus,
}

/// Overall outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Every picked category was delivered on this date already; nothing sent
    AlreadyDelivered,
    /// No category had any item
    NothingToSend,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub status: RunStatus,
    pub items: Vec<ItemReport>,
}

impl RunReport {
    fn empty(date: NaiveDate, status: RunStatus) -> Self {
        Self {
            date,
            status,
            items: Vec::new(),
        }
    }

    pub fn delivered(&self) -> usize {
        self.items
            .iter()
            .filter(|r| r.status == ItemStatus::Delivered)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|r| matches!(r.status, ItemStatus::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// The first transport failure as an error
    pub fn first_failure(&self) -> Option<Error> {
        self.items.iter().find_map(|r| match &r.status {
            ItemStatus::Failed(reason) => Some(Error::delivery(&r.item_id, reason)),
            _ => None,
        })
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            RunStatus::AlreadyDelivered => {
                return write!(f, "{}: already delivered, nothing sent", self.date)
            }
            RunStatus::NothingToSend => return write!(f, "{}: nothing sent today", self.date),
            RunStatus::Completed => {}
        }

        writeln!(
            f,
            "{}: {}/{} items delivered",
            self.date,
            self.delivered(),
            self.items.len()
        )?;
        for item in &self.items {
            let status = match &item.status {
                ItemStatus::Delivered => "delivered".to_string(),
                ItemStatus::Previewed => "previewed".to_string(),
                ItemStatus::Failed(reason) => format!("FAILED: {reason}"),
            };
            writeln!(
                f,
                "  {:<18} {:<24} {} chunk(s) {status}",
                item.category.id(),
                item.item_id,
                item.chunks
            )?;
        }
        Ok(())
    }
}

/// One delivery run over a corpus and ledger
pub struct DailyRun<'a> {
    corpus: &'a CorpusIndex,
    ledger: &'a HistoryLedger,
    transport: &'a dyn Transport,
    source: Box<dyn RandomSource>,
    assembler: MessageAssembler,
    max_chars: usize,
    dry_run: bool,
    force: bool,
}

impl<'a> DailyRun<'a> {
    pub fn new(
        corpus: &'a CorpusIndex,
        ledger: &'a HistoryLedger,
        transport: &'a dyn Transport,
    ) -> Self {
        Self {
            corpus,
            ledger,
            transport,
            source: Box::new(EntropySource),
            assembler: MessageAssembler::new(),
            max_chars: 4096,
            dry_run: false,
            force: false,
        }
    }

    /// Build with rotation mode, labels, limits and dry-run from configuration
    pub fn from_config(
        config: &Config,
        corpus: &'a CorpusIndex,
        ledger: &'a HistoryLedger,
        transport: &'a dyn Transport,
    ) -> Self {
        Self::new(corpus, ledger, transport)
            .with_source(config.rotation.mode.source())
            .with_assembler(MessageAssembler::from_config(&config.delivery))
            .with_max_chars(config.delivery.max_message_chars)
            .dry_run(config.delivery.dry_run)
    }

    pub fn with_source(mut self, source: Box<dyn RandomSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_assembler(mut self, assembler: MessageAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Send through the transport but never record
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Deliver categories even if they were already delivered on the date
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Deliver one item per category for `date`
    pub fn run(self, date: NaiveDate) -> Result<RunReport> {
        let picker = DailyPicker::new(RotationSelector::new(self.corpus, self.ledger), self.source);
        let picks = picker.pick_for_date(date)?;

        if picks.is_empty() {
            tracing::warn!(date = %date, "No items available, nothing sent");
            return Ok(RunReport::empty(date, RunStatus::NothingToSend));
        }

        let mut pending = Vec::with_capacity(picks.len());
        for (category, item) in picks.iter() {
            if !self.force && self.ledger.was_delivered_on(category, date)? {
                tracing::info!(date = %date, category = %category, "Already delivered for date, skipping");
                continue;
            }
            pending.push(item);
        }

        if pending.is_empty() {
            return Ok(RunReport::empty(date, RunStatus::AlreadyDelivered));
        }

        // Nothing goes out unless every pick fits the limit
        let prepared = pending
            .into_iter()
            .map(|item| prepare(item, &self.assembler, self.max_chars))
            .collect::<Result<Vec<_>>>()?;

        let mut items = Vec::with_capacity(prepared.len());
        for message in &prepared {
            items.push(deliver(
                message,
                date,
                self.ledger,
                self.transport,
                self.dry_run,
            )?);
        }

        let report = RunReport {
            date,
            status: RunStatus::Completed,
            items,
        };

        tracing::info!(
            date = %date,
            delivered = report.delivered(),
            failed = report.failed().count(),
            dry_run = self.dry_run,
            transport = self.transport.name(),
            "Daily run finished"
        );

        Ok(report)
    }

    /// Pick and deliver a single item from one category
    ///
    /// Ignores whether anything was delivered on `date` already. Returns
    /// `None` when the category is empty.
    pub fn deliver_one(self, category: Category, date: NaiveDate) -> Result<Option<ItemReport>> {
        let picker = DailyPicker::new(RotationSelector::new(self.corpus, self.ledger), self.source);

        let Some(item) = picker.pick_one(date, category)? else {
            tracing::warn!(category = %category, "No items available");
            return Ok(None);
        };

        let message = prepare(item, &self.assembler, self.max_chars)?;
        deliver(&message, date, self.ledger, self.transport, self.dry_run).map(Some)
    }
}

/// An item assembled and ready for the transport
struct Prepared<'a> {
    item: &'a Item,
    chunks: Vec<Chunk>,
    action: Option<SourceAction>,
}

fn prepare<'a>(item: &'a Item, assembler: &MessageAssembler, max_chars: usize) -> Result<Prepared<'a>> {
    Ok(Prepared {
        item,
        chunks: assembler.assemble(item, max_chars)?,
        action: assembler.action_for(item),
    })
}

fn deliver(
    message: &Prepared<'_>,
    date: NaiveDate,
    ledger: &HistoryLedger,
    transport: &dyn Transport,
    dry_run: bool,
) -> Result<ItemReport> {
    let item = message.item;
    let report = |status| ItemReport {
        category: item.category,
        item_id: item.id.clone(),
        chunks: message.chunks.len(),
        status,
    };

    for chunk in &message.chunks {
        let chunk_action = if chunk.has_action {
            message.action.as_ref()
        } else {
            None
        };

        if let Err(e) = transport.send(chunk, chunk_action) {
            tracing::error!(
                item_id = %item.id,
                category = %item.category,
                chunk = chunk.index,
                total = chunk.total,
                transport = transport.name(),
                error = %e,
                "Failed to send chunk"
            );
            return Ok(report(ItemStatus::Failed(format!("{e:#}"))));
        }
    }

    if dry_run {
        tracing::info!(item_id = %item.id, category = %item.category, "Dry run, delivery not recorded");
        return Ok(report(ItemStatus::Previewed));
    }

    ledger.record_item(item, date)?;
    Ok(report(ItemStatus::Delivered))
}
