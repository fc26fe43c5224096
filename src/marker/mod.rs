mod emitter;
mod filter;
mod indexer;
mod scanner;
mod visibility;

pub mod document;
pub mod overlay;
pub mod selectors;
pub mod session;
pub mod types;

pub use document::Document;
pub use emitter::{emit_coordinates, format_bboxes};
pub use filter::filter_contained_candidates;
pub use indexer::{assign_indices, index_selector};
pub use overlay::{render_overlays, Color, OverlaySpec, Palette};
pub use scanner::{normalize_text, scan_candidates};
pub use selectors::{Selector, INTERACTIVE_SELECTORS};
pub use session::Session;
pub use types::{
    BoundingBox, Candidate, ComputedStyle, Coordinate, OverlayId, ViewportMetrics, INDEX_ATTRIBUTE,
    SCROLLBAR_CSS, SCROLLBAR_STYLE_ID,
};
pub use visibility::is_element_visible;

/// Knobs for one marking pass
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkOptions {
    pub palette: Palette,
}

/// Mark interactable elements on the page and return their click points.
///
/// Clears whatever the previous pass left behind, so calling this repeatedly
/// on an unchanged document gives the same result as calling it once.
pub fn mark_page<D: Document>(doc: &mut D, session: &mut Session, options: &MarkOptions) -> Vec<Coordinate> {
    session.clear(doc);

    if !doc.has_style(SCROLLBAR_STYLE_ID) {
        doc.inject_style(SCROLLBAR_STYLE_ID, SCROLLBAR_CSS);
    }

    let candidates = scan_candidates(doc, INTERACTIVE_SELECTORS);

    // Only keep inner clickable items
    let mut candidates = filter_contained_candidates(doc, candidates);

    assign_indices(doc, &mut candidates);
    render_overlays(doc, &candidates, options.palette, session);

    let coordinates = emit_coordinates(&candidates);
    tracing::info!("Marked {} interactive elements", coordinates.len());

    coordinates
}
