use super::document::Document;
use super::types::{OverlayId, INDEX_ATTRIBUTE};

/// Overlays painted by the most recent marking pass.
///
/// One session per document. Every marking pass clears it first, which is
/// what makes repeated passes over the same page idempotent.
#[derive(Debug, Clone, Default)]
pub struct Session {
    overlays: Vec<OverlayId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, id: OverlayId) {
        self.overlays.push(id);
    }

    pub fn overlays(&self) -> &[OverlayId] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Detach every overlay from the previous pass
    pub fn remove_overlays<D: Document>(&mut self, doc: &mut D) {
        for id in self.overlays.drain(..) {
            doc.remove_overlay(id);
        }
    }

    /// Remove overlays and strip index attributes from the whole document
    pub fn clear<D: Document>(&mut self, doc: &mut D) {
        let overlays = self.overlays.len();
        self.remove_overlays(doc);

        let stamped = doc.query_attribute(INDEX_ATTRIBUTE);
        let attributes = stamped.len();
        for node in stamped {
            doc.remove_attribute(node, INDEX_ATTRIBUTE);
        }

        tracing::debug!(
            "Session cleared: {} overlays, {} index attributes",
            overlays,
            attributes
        );
    }

    /// Clear and drop the session
    pub fn dispose<D: Document>(mut self, doc: &mut D) {
        self.clear(doc);
    }
}
