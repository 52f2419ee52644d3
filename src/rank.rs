//! Deterministic ranking of scored units.

use crate::score::ScoredUnit;

/// Order scored units by (score desc, unit char-length desc, corpus order
/// asc) and keep the top `k`. `k <= 0` means "no results".
///
/// The length tie-break is a mild bias against overly short, likely
/// fragmentary matches; corpus order makes the full ordering total, so
/// repeated calls on the same input agree exactly.
pub fn rank<'a>(mut scored: Vec<ScoredUnit<'a>>, k: i64) -> Vec<ScoredUnit<'a>> {
    if k <= 0 {
        return Vec::new();
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.unit
                    .text
                    .chars()
                    .count()
                    .cmp(&a.unit.text.chars().count())
            })
            .then(a.order.cmp(&b.order))
    });
    scored.truncate(k as usize);
    scored
}
