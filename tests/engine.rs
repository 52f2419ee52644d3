//! Library-level tests for the retrieval pipeline: the same session run
//! through every scoring strategy, plus the classification contract
//! callers rely on for reply phrasing.

use docsift::models::{DocumentText, ScoringStrategy, SearchOutcome, SessionSnapshot, UnitMode};
use docsift::search::{run_query, RetrievalParams};

fn session(docs: &[(&str, &[&str])]) -> SessionSnapshot {
    SessionSnapshot {
        id: "it".to_string(),
        documents: docs
            .iter()
            .map(|(name, pages)| DocumentText {
                name: name.to_string(),
                pages: pages.iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
    }
}

fn page_params(strategy: ScoringStrategy) -> RetrievalParams {
    RetrievalParams {
        unit_mode: UnitMode::Page,
        strategy,
        ..RetrievalParams::default()
    }
}

fn medical_session() -> SessionSnapshot {
    session(&[
        (
            "analgesia.pdf",
            &[
                "El paciente recibió 5 mg de morfina cada 4 horas.",
                "Reevaluar la dosis de morfina si aparece sedación profunda.",
            ],
        ),
        (
            "triage.pdf",
            &["Clasificación inicial del paciente según gravedad."],
        ),
        ("vacio.pdf", &["", "   "]),
    ])
}

#[test]
fn every_strategy_finds_the_morphine_pages() {
    for strategy in [
        ScoringStrategy::Overlap,
        ScoringStrategy::Occurrence,
        ScoringStrategy::TfIdf,
    ] {
        let outcome = run_query(&medical_session(), "morfina", 5, &page_params(strategy));
        let hits = outcome.hits();
        assert_eq!(hits.len(), 2, "strategy {:?}", strategy);
        assert!(hits.iter().all(|h| h.document_name == "analgesia.pdf"));
        assert!(hits.iter().all(|h| h.score > 0.0));
        assert!(hits.iter().all(|h| h.snippet.to_lowercase().contains("morfina")));
    }
}

#[test]
fn overlap_scores_match_the_reference_example() {
    // "morfina dosis" against a page containing only "morfina": 1/2.
    let outcome = run_query(
        &medical_session(),
        "morfina dosis",
        1,
        &page_params(ScoringStrategy::Overlap),
    );
    let hits = outcome.hits();
    assert_eq!(hits.len(), 1);
    // Page 2 matches both terms (score 1.0) and outranks page 1 (0.5).
    assert_eq!(hits[0].page_number, Some(2));
    assert!((hits[0].score - 1.0).abs() < 1e-9);
}

#[test]
fn accents_in_query_and_document_are_interchangeable() {
    let s = session(&[("notas.pdf", &["El paciente recibió atención urgente."])]);
    for query in ["recibió", "recibio", "RECIBIO"] {
        let outcome = run_query(&s, query, 3, &page_params(ScoringStrategy::Overlap));
        assert_eq!(outcome.hits().len(), 1, "query {:?}", query);
    }
}

#[test]
fn empty_corpus_and_empty_query_are_distinct_outcomes() {
    let empty = session(&[]);
    let populated = session(&[("a.pdf", &["contenido"])]);

    assert!(matches!(
        run_query(&empty, "morfina", 3, &page_params(ScoringStrategy::Overlap)),
        SearchOutcome::EmptyCorpus
    ));
    assert!(matches!(
        run_query(&populated, "   ", 3, &page_params(ScoringStrategy::Overlap)),
        SearchOutcome::EmptyQuery
    ));
    // A session whose documents have no extractable text is an empty
    // corpus too, not an error.
    let blank = session(&[("scan.pdf", &["", ""])]);
    assert!(matches!(
        run_query(&blank, "morfina", 3, &page_params(ScoringStrategy::Overlap)),
        SearchOutcome::EmptyCorpus
    ));
}

#[test]
fn repeated_queries_return_identical_output() {
    let s = medical_session();
    for strategy in [
        ScoringStrategy::Overlap,
        ScoringStrategy::Occurrence,
        ScoringStrategy::TfIdf,
    ] {
        let params = page_params(strategy);
        let a = run_query(&s, "dosis de morfina", 5, &params);
        let b = run_query(&s, "dosis de morfina", 5, &params);
        let fingerprint = |o: &SearchOutcome| {
            o.hits()
                .iter()
                .map(|h| {
                    (
                        h.document_name.clone(),
                        h.page_number,
                        h.snippet.clone(),
                        h.score.to_bits(),
                    )
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}

#[test]
fn length_breaks_score_ties_then_corpus_order() {
    let long_page = format!("morfina {}", "contexto clínico adicional ".repeat(20));
    let s = session(&[
        ("a.pdf", &["morfina breve"]),
        ("b.pdf", &[long_page.as_str()]),
    ]);
    let outcome = run_query(&s, "morfina", 2, &page_params(ScoringStrategy::Overlap));
    let hits = outcome.hits();
    assert_eq!(hits.len(), 2);
    // Equal overlap scores; the longer unit ranks first.
    assert_eq!(hits[0].document_name, "b.pdf");
    assert_eq!(hits[1].document_name, "a.pdf");
}

#[test]
fn chunk_mode_splits_long_documents_and_drops_page_numbers() {
    let body = "La dosis de morfina se ajusta según la respuesta. ".repeat(60);
    let s = session(&[("largo.pdf", &[body.as_str()])]);
    let params = RetrievalParams {
        unit_mode: UnitMode::Chunk,
        ..RetrievalParams::default()
    };
    let outcome = run_query(&s, "morfina", 10, &params);
    let hits = outcome.hits();
    assert!(hits.len() > 1);
    assert!(hits.iter().all(|h| h.page_number.is_none()));
    assert!(hits
        .iter()
        .all(|h| h.snippet.chars().count() <= params.snippet_window + 2));
}
