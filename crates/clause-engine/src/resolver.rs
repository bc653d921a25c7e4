//! Candidate resolver: one representative span per clause type

use std::cmp::Ordering;

use shared_types::{ClauseType, RawSpan};

/// Pick the highest-confidence span for every clause type present.
///
/// Ties go to the earlier start offset, then to discovery order. Output is in
/// order of each type's first appearance in `candidates`.
pub fn resolve(candidates: Vec<RawSpan>) -> Vec<RawSpan> {
    let mut groups: Vec<(ClauseType, Vec<RawSpan>)> = Vec::new();

    for span in candidates {
        match groups.iter_mut().find(|(ty, _)| *ty == span.clause_type) {
            Some((_, group)) => group.push(span),
            None => groups.push((span.clause_type, vec![span])),
        }
    }

    groups
        .into_iter()
        .filter_map(|(clause_type, mut group)| {
            group.sort_by(rank);
            tracing::debug!(
                clause_type = %clause_type,
                candidates = group.len(),
                "Resolved clause type"
            );
            group.into_iter().next()
        })
        .collect()
}

fn rank(a: &RawSpan, b: &RawSpan) -> Ordering {
    b.confidence
        .partial_cmp(&a.confidence)
        .unwrap_or(Ordering::Equal)
        .then(a.start_offset.cmp(&b.start_offset))
}
