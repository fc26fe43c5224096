use super::document::Document;
use super::types::{Candidate, INDEX_ATTRIBUTE};

/// Assign 0-based indices in document order and stamp them on the elements.
///
/// Anchors are forced to open in the same tab: the agent only ever sees a
/// screenshot of one page.
pub fn assign_indices<D: Document>(doc: &mut D, candidates: &mut [Candidate<D::Node>]) {
    for (index, candidate) in candidates.iter_mut().enumerate() {
        if candidate.element_type == "a" {
            doc.set_attribute(candidate.element, "target", "_self");
        }

        doc.set_attribute(candidate.element, INDEX_ATTRIBUTE, &index.to_string());
        candidate.index = Some(index);
    }
}

/// CSS selector that finds the element stamped with `index`
pub fn index_selector(index: usize) -> String {
    format!("[{}='{}']", INDEX_ATTRIBUTE, index)
}
