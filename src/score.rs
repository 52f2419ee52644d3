//! Relevance scoring strategies.
//!
//! Historically the system carried three incompatible scoring code paths;
//! here they are variants of one [`ScoringStrategy`] dispatched from a
//! single entry point, so the same corpus can be run through each and
//! compared.
//!
//! A score of exactly zero means "not a candidate": such units are never
//! emitted, so downstream ranking only ever sees positive scores.

use std::collections::{HashMap, HashSet};

use crate::models::{RetrievalUnit, ScoringStrategy};

/// A unit that scored above zero, tagged with its corpus position for
/// the deterministic ranking tie-break.
#[derive(Debug, Clone)]
pub struct ScoredUnit<'a> {
    pub unit: &'a RetrievalUnit,
    /// Index into the corpus-order unit sequence.
    pub order: usize,
    pub score: f64,
}

/// Score every unit against the query under the selected strategy,
/// keeping only strictly positive scores.
///
/// The tf-idf strategy needs the whole corpus as context; when the corpus
/// is degenerate (fewer than two units with any terms) it silently falls
/// back to term-overlap rather than failing.
pub fn score_units<'a>(
    units: &'a [RetrievalUnit],
    query_terms: &[String],
    strategy: ScoringStrategy,
) -> Vec<ScoredUnit<'a>> {
    if query_terms.is_empty() || units.is_empty() {
        return Vec::new();
    }

    let effective = match strategy {
        ScoringStrategy::TfIdf => {
            let populated = units.iter().filter(|u| !u.terms.is_empty()).count();
            if populated < 2 {
                ScoringStrategy::Overlap
            } else {
                ScoringStrategy::TfIdf
            }
        }
        other => other,
    };

    let scored = match effective {
        ScoringStrategy::Overlap => score_all(units, |u| overlap_score(query_terms, u)),
        ScoringStrategy::Occurrence => score_all(units, |u| occurrence_score(query_terms, u)),
        ScoringStrategy::TfIdf => tfidf_scores(units, query_terms),
    };

    scored
        .into_iter()
        .enumerate()
        .filter(|(_, s)| *s > 0.0)
        .map(|(order, score)| ScoredUnit {
            unit: &units[order],
            order,
            score,
        })
        .collect()
}

fn score_all(units: &[RetrievalUnit], f: impl Fn(&RetrievalUnit) -> f64) -> Vec<f64> {
    units.iter().map(f).collect()
}

/// Fraction of query-term occurrences present in the unit's term set.
/// Presence counts once per query occurrence, independent of how often
/// the unit repeats the term.
fn overlap_score(query_terms: &[String], unit: &RetrievalUnit) -> f64 {
    let unit_terms: HashSet<&str> = unit.terms.iter().map(String::as_str).collect();
    let matched = query_terms
        .iter()
        .filter(|t| unit_terms.contains(t.as_str()))
        .count();
    matched as f64 / query_terms.len().max(1) as f64
}

/// Total occurrences of the query terms among the unit's terms; repeated
/// matches add up, rewarding dense units.
fn occurrence_score(query_terms: &[String], unit: &RetrievalUnit) -> f64 {
    let freq = term_frequencies(&unit.terms);
    query_terms
        .iter()
        .map(|t| freq.get(t.as_str()).copied().unwrap_or(0))
        .sum::<usize>() as f64
}

/// Cosine similarity between query and unit vectors under tf-idf
/// weighting over the whole corpus, with smoothed idf
/// `ln((N+1)/(df+1)) + 1` so rare terms weigh more without any term
/// weighing zero.
fn tfidf_scores(units: &[RetrievalUnit], query_terms: &[String]) -> Vec<f64> {
    let n = units.iter().filter(|u| !u.terms.is_empty()).count();

    // Document frequency over distinct terms per unit.
    let mut df: HashMap<&str, usize> = HashMap::new();
    for unit in units {
        let distinct: HashSet<&str> = unit.terms.iter().map(String::as_str).collect();
        for term in distinct {
            *df.entry(term).or_insert(0) += 1;
        }
    }

    let idf = |term: &str| -> f64 {
        let d = df.get(term).copied().unwrap_or(0);
        ((n as f64 + 1.0) / (d as f64 + 1.0)).ln() + 1.0
    };

    let query_tf = term_frequencies(query_terms);
    let query_weights: HashMap<&str, f64> = query_tf
        .iter()
        .map(|(t, tf)| (*t, *tf as f64 * idf(t)))
        .collect();
    let query_norm = query_weights.values().map(|w| w * w).sum::<f64>().sqrt();
    if query_norm < f64::EPSILON {
        return vec![0.0; units.len()];
    }

    units
        .iter()
        .map(|unit| {
            if unit.terms.is_empty() {
                return 0.0;
            }
            let tf = term_frequencies(&unit.terms);
            let unit_norm = tf
                .iter()
                .map(|(t, f)| {
                    let w = *f as f64 * idf(t);
                    w * w
                })
                .sum::<f64>()
                .sqrt();
            if unit_norm < f64::EPSILON {
                return 0.0;
            }
            let dot: f64 = query_weights
                .iter()
                .map(|(t, qw)| {
                    let uw = tf.get(t).copied().unwrap_or(0) as f64 * idf(t);
                    qw * uw
                })
                .sum();
            dot / (query_norm * unit_norm)
        })
        .collect()
}

fn term_frequencies(terms: &[String]) -> HashMap<&str, usize> {
    let mut freq = HashMap::new();
    for t in terms {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }
    freq
}
