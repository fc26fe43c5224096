use std::fmt::Debug;

use super::overlay::OverlaySpec;
use super::selectors::Selector;
use super::types::{BoundingBox, ComputedStyle, OverlayId, ViewportMetrics};

/// Host document the marking pipeline runs against.
///
/// `Node` is a non-owning handle: the document keeps ownership of its
/// elements, handles are only meaningful for the document that issued them.
pub trait Document {
    type Node: Copy + Eq + Debug;

    /// Elements matching any selector, in document order, each at most once
    fn query_selector_all(&self, selectors: &[Selector]) -> Vec<Self::Node>;

    /// Elements currently carrying the attribute, in document order
    fn query_attribute(&self, name: &str) -> Vec<Self::Node>;

    fn tag_name(&self, node: Self::Node) -> String;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attribute(&mut self, node: Self::Node, name: &str);

    /// Raw `textContent`, before any whitespace normalization
    fn text_content(&self, node: Self::Node) -> String;

    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// `(offsetWidth, offsetHeight)`
    fn offset_size(&self, node: Self::Node) -> (f64, f64);

    fn bounding_client_rect(&self, node: Self::Node) -> BoundingBox;

    /// True when `ancestor` is a strict structural ancestor of `node`
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool;

    fn viewport(&self) -> ViewportMetrics;

    /// Paint an overlay above the page and return its handle
    fn append_overlay(&mut self, spec: &OverlaySpec) -> OverlayId;

    /// Detach an overlay. Unknown handles are ignored.
    fn remove_overlay(&mut self, id: OverlayId);

    fn has_style(&self, id: &str) -> bool;

    fn inject_style(&mut self, id: &str, css: &str);
}
