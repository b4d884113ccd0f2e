//! Corpus loader for directories of JSON item files
//!
//! Each `*.json` file holds `{"category": "...", "items": [...]}`. Files are
//! read in file-name order so the resulting load order is stable. Records
//! that fail validation are rejected individually and reported; they never
//! reach the [`CorpusIndex`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use super::{CorpusError, CorpusIndex};
use crate::config::CorpusConfig;
use crate::error::Result;
use crate::models::{Category, Item, ItemFile, RawItem};

/// Maximum length of an item id, in characters
pub const MAX_ID_CHARS: usize = 200;

/// A record (or whole file) that was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub file: String,
    /// `None` when the whole file was rejected
    pub id: Option<String>,
    pub reason: String,
}

/// Summary of a load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files: usize,
    pub loaded: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn reject(&mut self, file: &str, id: Option<String>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(file = %file, id = ?id, reason = %reason, "Rejected corpus record");
        self.rejected.push(RejectedRecord {
            file: file.to_string(),
            id,
            reason,
        });
    }
}

/// Loads and validates a corpus directory
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    dir: PathBuf,
    min_text_chars: usize,
}

impl CorpusLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            min_text_chars: 10,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(&config.dir).with_min_text_chars(config.min_text_chars)
    }

    /// Set the minimum text length, in characters after trimming
    pub fn with_min_text_chars(mut self, min: usize) -> Self {
        self.min_text_chars = min;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every item file in the directory
    ///
    /// A missing directory yields an empty corpus. Only failures to list the
    /// directory itself are returned as errors.
    pub fn load(&self) -> Result<(CorpusIndex, LoadReport)> {
        let mut report = LoadReport::default();

        if !self.dir.exists() {
            tracing::warn!(path = %self.dir.display(), "Corpus directory not found");
            return Ok((CorpusIndex::new(), report));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut items = Vec::new();
        let mut seen: HashSet<(Category, String)> = HashSet::new();

        for path in &files {
            report.files += 1;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<ItemFile>(&content).map_err(|e| e.to_string())
                });
            let file = match parsed {
                Ok(file) => file,
                Err(reason) => {
                    report.reject(&file_name, None, reason);
                    continue;
                }
            };

            let default_category = match file.category.as_deref().map(str::parse::<Category>) {
                None => None,
                Some(Ok(category)) => Some(category),
                Some(Err(e)) => {
                    report.reject(&file_name, None, e.to_string());
                    continue;
                }
            };

            let mut file_count = 0usize;
            for value in file.items {
                let id_hint = value.get("id").and_then(|v| v.as_str()).map(String::from);

                let raw: RawItem = match serde_json::from_value(value) {
                    Ok(raw) => raw,
                    Err(e) => {
                        report.reject(&file_name, id_hint, e.to_string());
                        continue;
                    }
                };

                let item = match validate_item(raw, default_category, self.min_text_chars) {
                    Ok(item) => item,
                    Err(e) => {
                        report.reject(&file_name, id_hint, e.to_string());
                        continue;
                    }
                };

                if !seen.insert((item.category, item.id.clone())) {
                    let reason = CorpusError::DuplicateId {
                        id: item.id.clone(),
                        category: item.category,
                    };
                    report.reject(&file_name, Some(item.id), reason.to_string());
                    continue;
                }

                file_count += 1;
                items.push(item);
            }

            tracing::debug!(file = %file_name, count = file_count, "Loaded corpus file");
        }

        report.loaded = items.len();
        let corpus = CorpusIndex::from_items(items)?;

        tracing::info!(
            total = report.loaded,
            files = report.files,
            rejected = report.rejected.len(),
            "Corpus loaded"
        );

        Ok((corpus, report))
    }
}

/// Validate a raw record and turn it into an [`Item`]
pub fn validate_item(
    raw: RawItem,
    default_category: Option<Category>,
    min_text_chars: usize,
) -> std::result::Result<Item, CorpusError> {
    let id = raw.id.trim().to_string();
    let invalid = |reason: String| CorpusError::InvalidItem {
        id: id.clone(),
        reason,
    };

    if id.is_empty() {
        return Err(invalid("id is empty".to_string()));
    }
    if id.chars().count() > MAX_ID_CHARS {
        return Err(invalid(format!("id longer than {MAX_ID_CHARS} characters")));
    }

    let category = match raw.category.as_deref() {
        Some(name) => name.parse::<Category>()?,
        None => default_category.ok_or_else(|| invalid("no category".to_string()))?,
    };

    let text = raw.text.trim().to_string();
    let text_chars = text.chars().count();
    if text_chars < min_text_chars {
        return Err(invalid(format!(
            "text has {text_chars} characters, minimum is {min_text_chars}"
        )));
    }

    let source_url = match non_blank(raw.source_url) {
        Some(url) => Some(check_url(&url).map_err(invalid)?),
        None => None,
    };

    Ok(Item {
        id,
        category,
        text,
        title: non_blank(raw.title),
        author: non_blank(raw.author),
        book: non_blank(raw.book),
        section: non_blank(raw.section),
        source_url,
        tags: raw.tags,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_url(raw: &str) -> std::result::Result<String, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid source_url '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(raw.to_string()),
        _ => Err(format!("source_url '{raw}' is not an absolute http(s) URL")),
    }
}
