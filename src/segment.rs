//! Sentence-boundary-aware text segmentation.
//!
//! Splits a document's text into overlapping windows of roughly
//! `target_size` characters. When a window's right edge falls mid-text,
//! the segmenter looks ahead a bounded distance for the next period and
//! snaps the boundary to it, so chunks tend to end on whole sentences.
//!
//! All indexing is in characters, mapped back to byte offsets only when
//! slicing, so multibyte input can never split inside a UTF-8 sequence.
//!
//! # Algorithm
//!
//! 1. Take `target_size` chars from the current start.
//! 2. If the edge is strictly before end-of-text, scan up to `lookahead`
//!    further chars for a `'.'` and extend the chunk through it.
//! 3. Advance the next start to `max(end - overlap, start + 1)` — forward
//!    progress is guaranteed for any overlap, including `overlap >= target_size`.
//! 4. Trim each chunk; drop chunks that normalize to nothing.
//!
//! The snap goes to the *first* period in the lookahead window, which can
//! yield a short trailing chunk when a period sits just past the target
//! edge; `lookahead` is a tunable, not a contract.

use crate::normalize::normalize;

/// Default lookahead distance (chars) for the sentence-boundary snap.
pub const DEFAULT_LOOKAHEAD: usize = 200;

/// Split `text` into overlapping, sentence-snapped chunks.
///
/// Deterministic for fixed inputs. Empty or whitespace-only text yields
/// no chunks. The number of iterations is bounded by the char count of
/// `text`: every step advances the window start by at least one char.
pub fn segment(text: &str, target_size: usize, overlap: usize, lookahead: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let byte_offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = chars.len();
    if n == 0 {
        return Vec::new();
    }

    // A zero window would stall; config validation rejects it, but the
    // segmenter itself must still terminate.
    let target = target_size.max(1);

    let byte_at = |idx: usize| -> usize {
        if idx >= n {
            text.len()
        } else {
            byte_offsets[idx]
        }
    };

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let mut end = (start + target).min(n);

        if end < n {
            let scan_to = (end + lookahead).min(n);
            if let Some(pos) = (end..scan_to).find(|&j| chars[j] == '.') {
                end = pos + 1;
            }
        }

        let piece = text[byte_at(start)..byte_at(end)].trim();
        if !normalize(piece).trim().is_empty() {
            chunks.push(piece.to_string());
        }

        if end >= n {
            break;
        }
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = segment("Hello, world!", 800, 150, DEFAULT_LOOKAHEAD);
        assert_eq!(chunks, vec!["Hello, world!"]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(segment("", 800, 150, DEFAULT_LOOKAHEAD).is_empty());
        assert!(segment("   \n\t  ", 800, 150, DEFAULT_LOOKAHEAD).is_empty());
    }

    #[test]
    fn test_three_chunks_for_2000_chars() {
        // 2000 chars, no periods: windows land at [0,800) [650,1450) [1300,2000).
        let text = "a".repeat(2000);
        let chunks = segment(&text, 800, 150, DEFAULT_LOOKAHEAD);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 800);
        assert_eq!(chunks[2].chars().count(), 700);
    }

    #[test]
    fn test_snaps_to_nearby_period() {
        // Period at char 25, target 20: the first chunk extends through it.
        let text = "one two three four five x. and then the remainder continues here";
        let chunks = segment(text, 20, 5, DEFAULT_LOOKAHEAD);
        assert!(chunks[0].ends_with('.'), "chunk was: {:?}", chunks[0]);
    }

    #[test]
    fn test_period_beyond_lookahead_ignored() {
        let text = format!("{}{}", "b".repeat(50), ". tail");
        let chunks = segment(&text, 10, 2, 5);
        assert_eq!(chunks[0].chars().count(), 10);
    }

    #[test]
    fn test_progress_when_overlap_exceeds_target() {
        let text = "c".repeat(300);
        let chunks = segment(&text, 50, 500, DEFAULT_LOOKAHEAD);
        assert!(!chunks.is_empty());
        // Step size degrades to 1 char; bounded by text length, not looping.
        assert!(chunks.len() <= 300);
    }

    #[test]
    fn test_overlap_window_invariants() {
        // start_{i+1} <= end_i and start_{i+1} >= end_i - overlap, observed
        // through chunk lengths: every chunk but the last is target-sized.
        let text = "d".repeat(2000);
        let chunks = segment(&text, 800, 150, DEFAULT_LOOKAHEAD);
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 800);
        }
    }

    #[test]
    fn test_coverage_outside_overlap() {
        // With zero overlap and no snapping, concatenation reconstructs
        // the original text exactly (nothing silently dropped).
        let text = "e".repeat(1999);
        let chunks = segment(&text, 500, 0, DEFAULT_LOOKAHEAD);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_multibyte_boundary_safety() {
        let text = "Ínterêsse público: ação judicial. ".repeat(40);
        let chunks = segment(&text, 100, 20, DEFAULT_LOOKAHEAD);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(text.contains(c.as_str()));
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma. ".repeat(120);
        assert_eq!(
            segment(&text, 850, 130, DEFAULT_LOOKAHEAD),
            segment(&text, 850, 130, DEFAULT_LOOKAHEAD)
        );
    }
}
