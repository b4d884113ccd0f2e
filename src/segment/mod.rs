//! Boundary-preferring text segmentation
//!
//! Long text is cut greedily into chunks of at most `max_chars` characters.
//! Inside each window the cut is placed, in order of preference, after a
//! paragraph break, after sentence-ending punctuation or a newline, after a
//! space, or (as a last resort) exactly at the window end. A boundary only
//! counts when it lies past the middle of the window, which keeps chunks
//! reasonably balanced.
//!
//! Lengths are measured in Unicode scalar values, so a cut never lands
//! inside a multi-byte character.

use thiserror::Error;

/// Characters that end a sentence for splitting purposes
const SENTENCE_ENDS: [char; 5] = ['.', '!', '?', '\u{05C3}', '\n'];

/// Segmentation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Chunk budget must be at least one character")]
    ZeroBudget,
}

/// The kind of boundary a chunk was cut at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Paragraph,
    Sentence,
    Word,
    /// No usable boundary; cut exactly at the budget
    Hard,
}

/// A cut position inside a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPoint {
    /// Byte offset just past the boundary
    pub byte: usize,
    pub boundary: Boundary,
}

/// Length in characters
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Where to cut `text` so that the head holds at most `max_chars` characters
///
/// Returns `None` when the whole text already fits.
pub fn split_point(text: &str, max_chars: usize) -> Option<SplitPoint> {
    let mut window: Vec<(usize, char)> = Vec::with_capacity(max_chars);
    let mut window_end = None;
    for (pos, (byte, c)) in text.char_indices().enumerate() {
        if pos == max_chars {
            window_end = Some(byte);
            break;
        }
        window.push((byte, c));
    }
    let window_end = window_end?;
    let half = max_chars / 2;

    // Paragraph break: two consecutive newlines starting past the middle
    for i in (1..window.len()).rev() {
        if i - 1 <= half {
            break;
        }
        if window[i - 1].1 == '\n' && window[i].1 == '\n' {
            return Some(SplitPoint {
                byte: window[i].0 + 1,
                boundary: Boundary::Paragraph,
            });
        }
    }

    let last_past_half = |pred: &dyn Fn(char) -> bool| {
        window
            .iter()
            .enumerate()
            .rev()
            .take_while(|(pos, _)| *pos > half)
            .find(|(_, (_, c))| pred(*c))
            .map(|(_, (byte, c))| byte + c.len_utf8())
    };

    if let Some(byte) = last_past_half(&|c| SENTENCE_ENDS.contains(&c)) {
        return Some(SplitPoint {
            byte,
            boundary: Boundary::Sentence,
        });
    }

    if let Some(byte) = last_past_half(&|c| c == ' ') {
        return Some(SplitPoint {
            byte,
            boundary: Boundary::Word,
        });
    }

    Some(SplitPoint {
        byte: window_end,
        boundary: Boundary::Hard,
    })
}

/// Split `text` into chunks of at most `max_chars` characters
///
/// Text that already fits is returned unchanged as a single chunk. Otherwise
/// every chunk is trimmed, and whitespace around the cut points is dropped.
pub fn segment(text: &str, max_chars: usize) -> Result<Vec<String>, SegmentError> {
    if max_chars == 0 {
        return Err(SegmentError::ZeroBudget);
    }

    if char_len(text) <= max_chars {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while let Some(point) = split_point(rest, max_chars) {
        let head = rest[..point.byte].trim();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        rest = rest[point.byte..].trim();
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }

    tracing::debug!(
        chars = char_len(text),
        max_chars,
        chunks = chunks.len(),
        "Text segmented"
    );

    Ok(chunks)
}

/// Segmenter bound to a fixed character budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegmenter {
    max_chars: usize,
}

impl TextSegmenter {
    pub fn new(max_chars: usize) -> Result<Self, SegmentError> {
        if max_chars == 0 {
            return Err(SegmentError::ZeroBudget);
        }
        Ok(Self { max_chars })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn segment(&self, text: &str) -> Vec<String> {
        // max_chars is non-zero by construction
        segment(text, self.max_chars).unwrap_or_default()
    }

    /// Number of chunks `text` would produce
    pub fn count(&self, text: &str) -> usize {
        self.segment(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        let text = "  fits as is  ";
        assert_eq!(segment(text, 100).unwrap(), vec![text.to_string()]);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert_eq!(segment("abc", 0), Err(SegmentError::ZeroBudget));
        assert!(TextSegmenter::new(0).is_err());
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = format!("{}\n\n{}", "A.".repeat(50), "B.".repeat(50));
        let chunks = segment(&text, 150).unwrap();

        assert_eq!(chunks[0], "A.".repeat(50));
        assert_eq!(chunks[1], "B.".repeat(50));
    }

    #[test]
    fn test_early_paragraph_break_ignored() {
        // The break sits before the middle of the window, so the sentence
        // boundary further on wins
        let text = format!("ab\n\n{} tail end", "c.".repeat(40));
        let point = split_point(&text, 50).unwrap();
        assert_eq!(point.boundary, Boundary::Sentence);
        assert!(point.byte > 25);
    }

    #[test]
    fn test_word_boundary() {
        let text = "alpha beta gamma delta epsilon zeta";
        let point = split_point(text, 20).unwrap();
        assert_eq!(point.boundary, Boundary::Word);
        assert_eq!(&text[..point.byte], "alpha beta gamma ");
    }

    #[test]
    fn test_hard_cut_without_boundary() {
        let text = "x".repeat(25);
        let chunks = segment(&text, 10).unwrap();
        assert_eq!(chunks, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_hebrew_text_counts_chars_not_bytes() {
        let text = "שלום עולם ".repeat(30);
        let chunks = segment(&text, 40).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 40);
            assert!(!chunk.contains("שלוםעולם"));
        }
    }

    #[test]
    fn test_hebrew_sof_pasuq_is_sentence_end() {
        let text = format!("{}\u{05C3}{}", "א".repeat(30), "ב".repeat(30));
        let point = split_point(&text, 40).unwrap();
        assert_eq!(point.boundary, Boundary::Sentence);
        assert_eq!(char_len(&text[..point.byte]), 31);
    }

    #[test]
    fn test_repeated_words_never_split() {
        let text = "word ".repeat(2000);
        let chunks = segment(&text, 100).unwrap();

        for chunk in &chunks {
            assert!(char_len(chunk) <= 100);
            assert!(chunk.split(' ').all(|w| w == "word"));
        }
        let len = char_len(&text);
        assert_eq!(chunks.len(), 100);
        assert!((chunks.len() - 1) * 100 < len && len <= chunks.len() * 100);
    }

    #[test]
    fn test_whitespace_only_text_yields_one_chunk() {
        let text = " ".repeat(30);
        assert_eq!(segment(&text, 10).unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_segmenter_struct() {
        let segmenter = TextSegmenter::new(10).unwrap();
        assert_eq!(segmenter.max_chars(), 10);
        assert_eq!(segmenter.count("one two three four five"), 3);
    }
}
