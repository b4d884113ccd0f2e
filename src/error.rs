//! Unified error handling for the yomi crate
//!
//! Domain modules define their own error enums ([`CorpusError`],
//! [`SegmentError`], [`AssemblyError`]); this module wraps them into a single
//! [`Error`] that callers can match on, together with an [`ErrorCategory`]
//! used to decide whether an operation is safe to retry.
//!
//! # Usage
//!
//! ```rust,ignore
//! use yomi::error::Error;
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(error = %err, "delivery not confirmed, safe to retry");
//!     } else {
//!         tracing::error!(error = %err, "fatal error");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::corpus::CorpusError;
pub use crate::message::AssemblyError;
pub use crate::segment::SegmentError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// History ledger storage errors
    Storage,
    /// Corpus loading and lookup errors
    Corpus,
    /// Segmentation and message assembly errors
    Formatting,
    /// Transport errors reported by the delivery collaborator
    Delivery,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Corpus => "corpus",
            Self::Formatting => "formatting",
            Self::Delivery => "delivery",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the yomi crate
#[derive(Error, Debug)]
pub enum Error {
    /// The history ledger could not be read or written
    #[error("Ledger error during '{operation}': {reason}")]
    Ledger {
        operation: &'static str,
        reason: String,
    },

    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Segmentation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Message assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// The transport refused or failed to send a fragment
    #[error("Delivery failed for '{item_id}': {reason}")]
    Delivery { item_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using the unified error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a storage backend failure
    pub fn ledger(operation: &'static str, err: anyhow::Error) -> Self {
        Self::Ledger {
            operation,
            reason: format!("{err:#}"),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn delivery(item_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Delivery {
            item_id: item_id.into(),
            reason: reason.into(),
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Ledger { .. } => ErrorCategory::Storage,
            Self::Corpus(_) => ErrorCategory::Corpus,
            Self::Segment(_) | Self::Assembly(_) => ErrorCategory::Formatting,
            Self::Delivery { .. } => ErrorCategory::Delivery,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Serialization(_) => ErrorCategory::Other,
        }
    }

    /// Whether retrying the same operation later may succeed
    ///
    /// Ledger and transport failures leave the item unconfirmed; repeating
    /// the run is safe. Formatting and configuration errors are permanent.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Ledger { .. } | Self::Delivery { .. } | Self::Io(_)
        )
    }
}
