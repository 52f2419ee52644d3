//! Text normalization and tokenization.
//!
//! Every downstream stage — segmentation, scoring, snippet extraction —
//! compares text through this module, so accented and unaccented forms of
//! a word match ("recibió" and "recibio" tokenize identically).
//!
//! Normalization is NFD decomposition with nonspacing marks dropped, then
//! lowercasing. Both functions are pure and deterministic; empty or
//! whitespace-only input yields an empty term sequence, never an error.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Minimum term length; shorter tokens are discarded as noise.
const MIN_TERM_LEN: usize = 2;

/// Fold text to lowercase with combining diacritical marks stripped.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split text into normalized terms: maximal runs of ASCII alphanumerics
/// after diacritic folding, at least [`MIN_TERM_LEN`] chars each.
/// Duplicates are kept — term frequency matters to the scorer.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut terms = Vec::new();
    let mut current = String::new();

    for c in normalized.chars() {
        if c.is_ascii_alphanumeric() {
            current.push(c);
        } else if !current.is_empty() {
            if current.len() >= MIN_TERM_LEN {
                terms.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= MIN_TERM_LEN {
        terms.push(current);
    }

    terms
}

/// Fold a single char to its primary lowercase base form.
///
/// Unlike [`normalize`], this maps one input char to exactly one output
/// char, so callers can line up folded text with original char offsets
/// (the snippet extractor depends on this).
pub fn fold_char(c: char) -> char {
    let mut base = None;
    unicode_normalization::char::decompose_canonical(c, |d| {
        if base.is_none() && !is_combining_mark(d) {
            base = Some(d);
        }
    });
    let b = base.unwrap_or(c);
    b.to_lowercase().next().unwrap_or(b)
}
