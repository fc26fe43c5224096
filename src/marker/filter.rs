use super::document::Document;
use super::types::Candidate;

/// Keep only the innermost interactive elements.
///
/// A candidate is dropped when it structurally contains another candidate,
/// so a clickable wrapper gives way to the clickable child inside it.
/// Pairwise check, fine for the tens to hundreds of candidates a page yields.
pub fn filter_contained_candidates<D: Document>(
    doc: &D,
    candidates: Vec<Candidate<D::Node>>,
) -> Vec<Candidate<D::Node>> {
    let keep: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, outer)| {
            !candidates
                .iter()
                .enumerate()
                .any(|(j, inner)| i != j && doc.contains(outer.element, inner.element))
        })
        .collect();

    let total = candidates.len();
    let filtered: Vec<_> = candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, keep)| keep.then_some(candidate))
        .collect();

    tracing::debug!(
        "Containment filter: {} candidates, {} wrappers removed, {} remaining",
        total,
        total - filtered.len(),
        filtered.len()
    );

    filtered
}
