//! Query orchestration over a session corpus.
//!
//! The engine is pure and synchronous: it performs no I/O, holds no state
//! between calls, and operates on whatever snapshot it was handed.
//! Concurrent callers each bring their own snapshot; no locks are needed
//! at this layer, and nothing in here is fatal — every path ends in a
//! [`SearchOutcome`].
//!
//! # Pipeline
//!
//! 1. Tokenize the query ([`normalize`](crate::normalize)).
//! 2. Build the unit corpus for the session ([`corpus`](crate::corpus)).
//! 3. Score units under the configured strategy ([`score`](crate::score)),
//!    dropping zero scores.
//! 4. Rank by (score desc, length desc, corpus order) and truncate to
//!    top-k ([`rank`](crate::rank)).
//! 5. Render a snippet per hit ([`snippet`](crate::snippet)); hits whose
//!    snippet comes back empty are omitted.

use crate::corpus::{build_units, SegmentParams};
use crate::models::{ScoringStrategy, SearchHit, SearchOutcome, SessionSnapshot, UnitMode};
use crate::normalize::tokenize;
use crate::rank::rank;
use crate::score::score_units;
use crate::snippet;

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalParams {
    pub unit_mode: UnitMode,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sentence_lookahead: usize,
    pub strategy: ScoringStrategy,
    pub snippet_window: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            unit_mode: UnitMode::Chunk,
            chunk_size: 850,
            chunk_overlap: 130,
            sentence_lookahead: crate::segment::DEFAULT_LOOKAHEAD,
            strategy: ScoringStrategy::Overlap,
            snippet_window: snippet::DEFAULT_WINDOW,
        }
    }
}

/// Run one query against a session snapshot.
///
/// Empty queries and empty corpora are reported as distinct outcomes so
/// callers can tell "nothing to search" apart from "nothing matched";
/// neither is an error.
pub fn run_query(
    session: &SessionSnapshot,
    query: &str,
    top_k: i64,
    params: &RetrievalParams,
) -> SearchOutcome {
    let query_terms = tokenize(query);
    if query_terms.is_empty() {
        return SearchOutcome::EmptyQuery;
    }

    let units = build_units(
        session,
        params.unit_mode,
        SegmentParams {
            chunk_size: params.chunk_size,
            chunk_overlap: params.chunk_overlap,
            sentence_lookahead: params.sentence_lookahead,
        },
    );
    if units.is_empty() {
        return SearchOutcome::EmptyCorpus;
    }

    let scored = score_units(&units, &query_terms, params.strategy);
    let ranked = rank(scored, top_k);

    let hits: Vec<SearchHit> = ranked
        .into_iter()
        .filter_map(|s| {
            let excerpt = snippet::extract(&s.unit.text, &query_terms, params.snippet_window);
            if excerpt.is_empty() {
                return None;
            }
            Some(SearchHit {
                document_name: s.unit.document.clone(),
                page_number: s.unit.page,
                score: s.score,
                snippet: excerpt,
            })
        })
        .collect();

    if hits.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentText;

    fn session(docs: Vec<(&str, Vec<&str>)>) -> SessionSnapshot {
        SessionSnapshot {
            id: "test".to_string(),
            documents: docs
                .into_iter()
                .map(|(name, pages)| DocumentText {
                    name: name.to_string(),
                    pages: pages.into_iter().map(str::to_string).collect(),
                })
                .collect(),
        }
    }

    fn page_params() -> RetrievalParams {
        RetrievalParams {
            unit_mode: UnitMode::Page,
            ..RetrievalParams::default()
        }
    }

    #[test]
    fn test_empty_corpus_with_query_is_empty_corpus() {
        let s = session(vec![]);
        assert!(matches!(
            run_query(&s, "morfina", 3, &page_params()),
            SearchOutcome::EmptyCorpus
        ));
    }

    #[test]
    fn test_whitespace_query_is_empty_query() {
        let s = session(vec![("a.pdf", vec!["contenido real"])]);
        assert!(matches!(
            run_query(&s, "   ", 3, &page_params()),
            SearchOutcome::EmptyQuery
        ));
    }

    #[test]
    fn test_no_overlap_is_no_matches() {
        let s = session(vec![("a.pdf", vec!["contenido sobre otra cosa"])]);
        assert!(matches!(
            run_query(&s, "morfina", 3, &page_params()),
            SearchOutcome::NoMatches
        ));
    }

    #[test]
    fn test_match_carries_page_and_score() {
        let s = session(vec![(
            "med.pdf",
            vec!["primera página", "El paciente recibió 5 mg de morfina cada 4 horas."],
        )]);
        let outcome = run_query(&s, "morfina dosis", 3, &page_params());
        let hits = outcome.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_name, "med.pdf");
        assert_eq!(hits[0].page_number, Some(2));
        assert!((hits[0].score - 0.5).abs() < 1e-9);
        assert!(hits[0].snippet.contains("morfina"));
    }

    #[test]
    fn test_ranked_output_is_deterministic() {
        let s = session(vec![
            ("a.pdf", vec!["morfina en infusión continua"]),
            ("b.pdf", vec!["dosis de morfina según protocolo"]),
            ("c.pdf", vec!["sin términos relevantes"]),
        ]);
        for strategy in [
            ScoringStrategy::Overlap,
            ScoringStrategy::Occurrence,
            ScoringStrategy::TfIdf,
        ] {
            let params = RetrievalParams {
                strategy,
                ..page_params()
            };
            let first = run_query(&s, "dosis de morfina", 5, &params);
            let second = run_query(&s, "dosis de morfina", 5, &params);
            let a: Vec<_> = first
                .hits()
                .iter()
                .map(|h| (h.document_name.clone(), h.snippet.clone()))
                .collect();
            let b: Vec<_> = second
                .hits()
                .iter()
                .map(|h| (h.document_name.clone(), h.snippet.clone()))
                .collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_no_zero_scores_in_output() {
        let s = session(vec![
            ("a.pdf", vec!["morfina"]),
            ("b.pdf", vec!["nada que ver aquí"]),
        ]);
        let outcome = run_query(&s, "morfina", 10, &page_params());
        for hit in outcome.hits() {
            assert!(hit.score > 0.0);
        }
        assert_eq!(outcome.hits().len(), 1);
    }

    #[test]
    fn test_top_k_zero_means_no_results() {
        let s = session(vec![("a.pdf", vec!["morfina"])]);
        assert!(matches!(
            run_query(&s, "morfina", 0, &page_params()),
            SearchOutcome::NoMatches
        ));
    }

    #[test]
    fn test_chunk_mode_over_long_document() {
        let page: String = "La dosis de morfina se ajusta según la respuesta del paciente. "
            .repeat(30);
        let s = session(vec![("long.pdf", vec![page.as_str()])]);
        let outcome = run_query(&s, "morfina", 2, &RetrievalParams::default());
        let hits = outcome.hits();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.page_number.is_none()));
    }
}
