//! Snippet extraction.
//!
//! Renders a short excerpt of a unit as evidence for a match: a window of
//! characters centered on the first occurrence of any query term, with
//! `…` markers on whichever sides were truncated.
//!
//! Matching happens over a char-aligned folded view of the text (see
//! [`fold_char`](crate::normalize::fold_char)), so the located offset maps
//! directly back to the original characters and the snippet stays a
//! verbatim substring of the unit text.

use crate::normalize::fold_char;

/// Default snippet window in characters.
pub const DEFAULT_WINDOW: usize = 220;

const ELLIPSIS: char = '…';

/// Extract a window of about `window` chars around the first query-term
/// occurrence in `text`.
///
/// If no term occurs — defensive: scored units always contain one — the
/// leading `window` chars are returned instead. Empty text yields an
/// empty snippet, which callers treat as "omit this result". Never
/// panics; output length is at most `window + 2` chars including markers.
pub fn extract(text: &str, query_terms: &[String], window: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n == 0 || window == 0 {
        return String::new();
    }

    let offset = first_match_offset(&chars, query_terms).unwrap_or(0);

    let mut start = offset.saturating_sub(window / 2);
    let end = (start + window).min(n);
    // Pull the window back to full size when the match sits near the end.
    start = end.saturating_sub(window);

    let mut snippet = String::new();
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.extend(&chars[start..end]);
    if end < n {
        snippet.push(ELLIPSIS);
    }
    snippet
}

/// Char offset of the earliest occurrence of any query term in the
/// folded view of `chars`, or `None` when nothing matches.
fn first_match_offset(chars: &[char], query_terms: &[String]) -> Option<usize> {
    if query_terms.is_empty() {
        return None;
    }
    let folded: Vec<char> = chars.iter().map(|c| fold_char(*c)).collect();
    let needles: Vec<Vec<char>> = query_terms.iter().map(|t| t.chars().collect()).collect();

    (0..folded.len()).find(|&i| {
        needles
            .iter()
            .any(|needle| !needle.is_empty() && folded[i..].starts_with(needle))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::tokenize;

    #[test]
    fn test_short_text_returned_whole() {
        let text = "morfina cada 4 horas";
        let s = extract(text, &tokenize("morfina"), DEFAULT_WINDOW);
        assert_eq!(s, text);
    }

    #[test]
    fn test_window_centered_on_first_match() {
        let text = format!("{} morfina {}", "x".repeat(300), "y".repeat(300));
        let s = extract(&text, &tokenize("morfina"), 40);
        assert!(s.contains("morfina"));
        assert!(s.starts_with('…') && s.ends_with('…'));
    }

    #[test]
    fn test_match_near_end_keeps_full_window() {
        let text = format!("{}morfina", "x".repeat(500));
        let s = extract(&text, &tokenize("morfina"), 40);
        assert!(s.contains("morfina"));
        assert_eq!(s.chars().count(), 41); // 40 + leading marker
    }

    #[test]
    fn test_diacritics_matched_against_raw_text() {
        let text = "El paciente recibió morfina.";
        let s = extract(text, &tokenize("recibio"), 10);
        assert!(s.contains("recibió") || s.contains("recibi"));
    }

    #[test]
    fn test_no_match_falls_back_to_leading_window() {
        let text = "palabras iniciales del documento ".repeat(20);
        let s = extract(&text, &tokenize("ausente"), 30);
        assert!(s.starts_with("palabras"));
        assert!(s.ends_with('…'));
    }

    #[test]
    fn test_empty_text_empty_snippet() {
        assert_eq!(extract("", &tokenize("algo"), DEFAULT_WINDOW), "");
    }

    #[test]
    fn test_bounds_hold_for_all_inputs() {
        let cases = [
            ("corto", 220usize),
            ("un texto bastante más largo que la ventana usada aquí", 10),
            ("", 10),
        ];
        for (text, window) in cases {
            let s = extract(text, &tokenize("texto"), window);
            assert!(s.chars().count() <= window + 2);
            let stripped: String = s.chars().filter(|c| *c != '…').collect();
            assert!(text.contains(&stripped));
        }
    }
}
