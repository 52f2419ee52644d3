//! Core data models used throughout docsift.
//!
//! These types represent the session snapshot handed to the retrieval
//! engine, the units it scores, and the ranked hits it returns.

use serde::{Deserialize, Serialize};

/// Immutable view of one session's documents, assembled by the store
/// (or ad hoc by the CLI) and handed to the engine per query.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Opaque session id (client-supplied or server-generated).
    pub id: String,
    /// Documents owned by the session.
    pub documents: Vec<DocumentText>,
}

/// Extracted text of one uploaded document.
///
/// Pages are kept in extraction order; pages that failed to extract are
/// retained as empty strings so page numbers stay meaningful.
#[derive(Debug, Clone)]
pub struct DocumentText {
    /// Sanitized filename, unique within the session.
    pub name: String,
    /// Raw extracted text, one entry per physical page (index 0 = page 1).
    pub pages: Vec<String>,
}

impl DocumentText {
    /// Full document text with pages joined by newlines, used in chunk mode.
    pub fn joined_text(&self) -> String {
        self.pages.join("\n")
    }
}

/// Granularity of the retrievable units a corpus is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// One unit per physical page; keeps page-level attribution.
    Page,
    /// Overlapping sentence-aware windows over the whole document text.
    Chunk,
}

/// Relevance scoring strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Normalized term-overlap (default, dependency-free).
    Overlap,
    /// Total query-term occurrences in the unit; rewards density.
    Occurrence,
    /// Cosine similarity under corpus-wide tf-idf weighting.
    /// Falls back to [`ScoringStrategy::Overlap`] on degenerate corpora.
    TfIdf,
}

/// The atomic thing the scorer evaluates: a page or a chunk.
///
/// Derived fresh from the session snapshot on every query, never cached.
#[derive(Debug, Clone)]
pub struct RetrievalUnit {
    /// Name of the source document.
    pub document: String,
    /// 1-based page number; `None` in chunk mode.
    pub page: Option<usize>,
    /// Raw unit text (trimmed for chunks, verbatim for pages).
    pub text: String,
    /// Normalized terms of `text`, in order, duplicates kept.
    pub terms: Vec<String>,
}

/// A ranked search hit returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Source document name.
    pub document_name: String,
    /// 1-based page number, when the unit mode preserves it.
    pub page_number: Option<usize>,
    /// Relevance score; always strictly positive.
    pub score: f64,
    /// Human-readable excerpt centered on the first matched term.
    pub snippet: String,
}

/// Result of a query against a session, distinguishing the reasons an
/// answer can be empty so callers can phrase their replies accordingly.
///
/// None of these variants is an error: the engine always classifies,
/// never fails.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Ranked hits, best first. Never empty.
    Matches(Vec<SearchHit>),
    /// The corpus had units but none scored above zero.
    NoMatches,
    /// The query normalized to zero terms.
    EmptyQuery,
    /// The session has no retrievable units at all.
    EmptyCorpus,
}

impl SearchOutcome {
    /// The hits, if any.
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            SearchOutcome::Matches(hits) => hits,
            _ => &[],
        }
    }
}
