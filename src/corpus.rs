//! Session corpus assembly.
//!
//! Builds the full set of retrievable units for a session — pages or
//! chunks, per configured mode — fresh on every query. There is no
//! durable index: the corpus is a derived view over the snapshot and is
//! owned by the request that computed it.

use crate::models::{DocumentText, RetrievalUnit, SessionSnapshot, UnitMode};
use crate::normalize::tokenize;
use crate::segment::segment;

/// Segmentation parameters for chunk-mode corpora.
#[derive(Debug, Clone, Copy)]
pub struct SegmentParams {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sentence_lookahead: usize,
}

/// Build the ordered unit sequence for a session.
///
/// Documents are visited in filename-lexical order so corpus order (the
/// final ranking tie-break) is stable regardless of how the snapshot was
/// assembled. Documents with no extractable text contribute zero units;
/// whitespace-only pages are skipped but keep their slot in the page
/// numbering.
pub fn build_units(
    session: &SessionSnapshot,
    mode: UnitMode,
    params: SegmentParams,
) -> Vec<RetrievalUnit> {
    let mut docs: Vec<&DocumentText> = session.documents.iter().collect();
    docs.sort_by(|a, b| a.name.cmp(&b.name));

    let mut units = Vec::new();
    for doc in docs {
        match mode {
            UnitMode::Page => {
                for (idx, page) in doc.pages.iter().enumerate() {
                    if page.trim().is_empty() {
                        continue;
                    }
                    units.push(RetrievalUnit {
                        document: doc.name.clone(),
                        page: Some(idx + 1),
                        text: page.clone(),
                        terms: tokenize(page),
                    });
                }
            }
            UnitMode::Chunk => {
                let full = doc.joined_text();
                for chunk in segment(
                    &full,
                    params.chunk_size,
                    params.chunk_overlap,
                    params.sentence_lookahead,
                ) {
                    let terms = tokenize(&chunk);
                    units.push(RetrievalUnit {
                        document: doc.name.clone(),
                        page: None,
                        text: chunk,
                        terms,
                    });
                }
            }
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::DEFAULT_LOOKAHEAD;

    fn params() -> SegmentParams {
        SegmentParams {
            chunk_size: 850,
            chunk_overlap: 130,
            sentence_lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    fn snapshot(docs: Vec<DocumentText>) -> SessionSnapshot {
        SessionSnapshot {
            id: "s1".to_string(),
            documents: docs,
        }
    }

    #[test]
    fn test_page_mode_keeps_page_numbers_across_empty_pages() {
        let session = snapshot(vec![DocumentText {
            name: "guide.pdf".to_string(),
            pages: vec![
                "first page text".to_string(),
                "".to_string(),
                "third page text".to_string(),
            ],
        }]);
        let units = build_units(&session, UnitMode::Page, params());
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].page, Some(1));
        assert_eq!(units[1].page, Some(3));
    }

    #[test]
    fn test_documents_in_filename_order() {
        let session = snapshot(vec![
            DocumentText {
                name: "zeta.pdf".to_string(),
                pages: vec!["zeta content".to_string()],
            },
            DocumentText {
                name: "alpha.pdf".to_string(),
                pages: vec!["alpha content".to_string()],
            },
        ]);
        let units = build_units(&session, UnitMode::Page, params());
        assert_eq!(units[0].document, "alpha.pdf");
        assert_eq!(units[1].document, "zeta.pdf");
    }

    #[test]
    fn test_chunk_mode_has_no_page_attribution() {
        let session = snapshot(vec![DocumentText {
            name: "doc.pdf".to_string(),
            pages: vec!["one page. ".repeat(200)],
        }]);
        let units = build_units(&session, UnitMode::Chunk, params());
        assert!(units.len() > 1);
        assert!(units.iter().all(|u| u.page.is_none()));
    }

    #[test]
    fn test_empty_document_contributes_no_units() {
        let session = snapshot(vec![DocumentText {
            name: "scan.pdf".to_string(),
            pages: vec!["".to_string(), "   ".to_string()],
        }]);
        assert!(build_units(&session, UnitMode::Page, params()).is_empty());
        assert!(build_units(&session, UnitMode::Chunk, params()).is_empty());
    }

    #[test]
    fn test_units_carry_normalized_terms() {
        let session = snapshot(vec![DocumentText {
            name: "med.pdf".to_string(),
            pages: vec!["Recibió MORFINA".to_string()],
        }]);
        let units = build_units(&session, UnitMode::Page, params());
        assert_eq!(units[0].terms, vec!["recibio", "morfina"]);
    }
}
