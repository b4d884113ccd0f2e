//! Assembly of deliverable message fragments
//!
//! An [`Item`] becomes one or more [`Chunk`]s, each within a character
//! budget. The first chunk carries the header; later chunks start with a
//! "part i/n" marker. Only the final chunk is flagged to carry the source
//! action, so a transport attaches it exactly once.
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ 💎 הרב"ש                  │   │ חלק 2/2                   │
//! │ 📚 שלבי הסולם, א          │   │                          │
//! │                          │   │ ...rest of the text      │
//! │ first part of the text...│   │                 [📖 מקור] │
//! └──────────────────────────┘   └──────────────────────────┘
//!      has_action = false             has_action = true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DeliveryConfig;
use crate::models::Item;
use crate::segment::{char_len, segment, split_point, SegmentError};

/// Default label before continuation numbers
pub const DEFAULT_CONTINUATION_LABEL: &str = "חלק";

/// Default label of the source link action
pub const DEFAULT_ACTION_LABEL: &str = "📖 מקור";

/// Attempts at sizing the continuation marker before using the uniform budget
const MARKER_SIZING_ATTEMPTS: usize = 3;

/// Message assembly errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Header needs {header_chars} characters but the message limit is {max_chars}")]
    HeaderTooLong {
        header_chars: usize,
        max_chars: usize,
    },

    #[error("Continuation marker needs {marker_chars} characters but the message limit is {max_chars}")]
    MarkerTooLong {
        marker_chars: usize,
        max_chars: usize,
    },

    #[error("Text cannot be split to fit {max_chars} characters per message")]
    DoesNotFit { max_chars: usize },

    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// One deliverable message fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// 1-based position
    pub index: usize,
    pub total: usize,
    /// Whether the transport should attach the source action to this chunk
    pub has_action: bool,
}

impl Chunk {
    pub fn char_count(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_last(&self) -> bool {
        self.index == self.total
    }
}

/// Link affordance rendered by the transport, e.g. a button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAction {
    pub label: String,
    pub url: String,
}

/// Turns items into budget-respecting chunks
#[derive(Debug, Clone)]
pub struct MessageAssembler {
    continuation_label: String,
    action_label: String,
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self {
            continuation_label: DEFAULT_CONTINUATION_LABEL.to_string(),
            action_label: DEFAULT_ACTION_LABEL.to_string(),
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self {
            continuation_label: config.continuation_label.clone(),
            action_label: config.action_label.clone(),
        }
    }

    pub fn with_continuation_label(mut self, label: impl Into<String>) -> Self {
        self.continuation_label = label.into();
        self
    }

    pub fn with_action_label(mut self, label: impl Into<String>) -> Self {
        self.action_label = label.into();
        self
    }

    /// Header placed before the text of the first chunk
    ///
    /// Ends with a blank line separating it from the text.
    pub fn render_header(&self, item: &Item) -> String {
        let mut lines = vec![format!("{} {}", item.category.emoji(), item.speaker())];

        if let Some(title) = item.title.as_deref() {
            lines.push(title.to_string());
        }

        let source: Vec<&str> = item
            .book
            .iter()
            .chain(item.section.iter())
            .map(String::as_str)
            .collect();
        if !source.is_empty() {
            lines.push(format!("📚 {}", source.join(", ")));
        }

        let mut header = lines.join("\n");
        header.push_str("\n\n");
        header
    }

    /// Prefix of chunk `index` out of `total`
    pub fn continuation_marker(&self, index: usize, total: usize) -> String {
        format!("{} {index}/{total}\n\n", self.continuation_label)
    }

    /// The source action, only for items with a source URL
    pub fn action_for(&self, item: &Item) -> Option<SourceAction> {
        item.source_url.as_ref().map(|url| SourceAction {
            label: self.action_label.clone(),
            url: url.clone(),
        })
    }

    /// Split an item into chunks of at most `max_chars` characters
    pub fn assemble(&self, item: &Item, max_chars: usize) -> Result<Vec<Chunk>, AssemblyError> {
        let header = self.render_header(item);
        let header_chars = char_len(&header);

        if header_chars >= max_chars {
            return Err(AssemblyError::HeaderTooLong {
                header_chars,
                max_chars,
            });
        }

        if header_chars + char_len(&item.text) <= max_chars {
            return Ok(vec![Chunk {
                text: format!("{header}{}", item.text),
                index: 1,
                total: 1,
                has_action: true,
            }]);
        }

        let first_budget = max_chars - header_chars;

        // The marker width depends on the final count, which depends on the
        // marker width; re-size until the guess holds
        let mut guess = 2;
        for _ in 0..MARKER_SIZING_ATTEMPTS {
            let marker_chars = char_len(&self.continuation_marker(guess, guess));
            if marker_chars >= max_chars {
                return Err(AssemblyError::MarkerTooLong {
                    marker_chars,
                    max_chars,
                });
            }

            let body = split_first(&item.text, first_budget, max_chars - marker_chars)?;
            let chunks = self.render(&header, body);
            if chunks.iter().all(|c| c.char_count() <= max_chars) {
                tracing::debug!(item_id = %item.id, chunks = chunks.len(), "Item assembled");
                return Ok(chunks);
            }
            guess = chunks.len();
        }

        self.assemble_uniform(item, &header, first_budget, max_chars)
    }

    /// Fallback: one budget for every chunk, sized for the worst-case marker
    fn assemble_uniform(
        &self,
        item: &Item,
        header: &str,
        first_budget: usize,
        max_chars: usize,
    ) -> Result<Vec<Chunk>, AssemblyError> {
        let worst = char_len(&item.text).max(2);
        let marker_chars = char_len(&self.continuation_marker(worst, worst));
        let budget = first_budget.min(max_chars.saturating_sub(marker_chars));

        if budget == 0 {
            return Err(AssemblyError::DoesNotFit { max_chars });
        }

        let body = segment(&item.text, budget)?;
        let chunks = self.render(header, body);

        if chunks.iter().any(|c| c.char_count() > max_chars) {
            return Err(AssemblyError::DoesNotFit { max_chars });
        }

        tracing::debug!(
            item_id = %item.id,
            chunks = chunks.len(),
            budget,
            "Item assembled with uniform budget"
        );
        Ok(chunks)
    }

    fn render(&self, header: &str, body: Vec<String>) -> Vec<Chunk> {
        let total = body.len();
        body.into_iter()
            .enumerate()
            .map(|(i, part)| {
                let index = i + 1;
                let text = if index == 1 {
                    format!("{header}{part}")
                } else {
                    format!("{}{part}", self.continuation_marker(index, total))
                };
                Chunk {
                    text,
                    index,
                    total,
                    has_action: index == total,
                }
            })
            .collect()
    }
}

/// Cut the first piece with its own budget, then segment the rest
fn split_first(
    text: &str,
    first_budget: usize,
    other_budget: usize,
) -> Result<Vec<String>, SegmentError> {
    let Some(point) = split_point(text, first_budget) else {
        return Ok(vec![text.to_string()]);
    };

    let head = text[..point.byte].trim();
    let rest = text[point.byte..].trim();

    let mut body = Vec::new();
    if !head.is_empty() {
        body.push(head.to_string());
    }
    if !rest.is_empty() {
        body.extend(segment(rest, other_budget)?);
    }
    Ok(body)
}
