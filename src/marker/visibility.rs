use super::document::Document;
use super::types::{BoundingBox, ComputedStyle, ViewportMetrics};

/// Check if an element is visible by style and inside the viewport
pub fn is_element_visible<D: Document>(doc: &D, node: D::Node) -> bool {
    let style = doc.computed_style(node);
    let (offset_width, offset_height) = doc.offset_size(node);
    let rect = doc.bounding_client_rect(node);

    is_visible_by_style(&style, offset_width, offset_height) && is_in_viewport(&rect, &doc.viewport())
}

/// Style half of the check. Opacity is compared to the literal `"0"` only,
/// so `"0.01"` still counts as visible.
pub fn is_visible_by_style(style: &ComputedStyle, offset_width: f64, offset_height: f64) -> bool {
    style.display != "none"
        && style.visibility != "hidden"
        && style.opacity != "0"
        && offset_width > 0.0
        && offset_height > 0.0
}

pub fn is_in_viewport(rect: &BoundingBox, viewport: &ViewportMetrics) -> bool {
    rect.intersects_viewport(viewport.width(), viewport.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(display: &str, visibility: &str, opacity: &str) -> ComputedStyle {
        ComputedStyle {
            display: display.to_string(),
            visibility: visibility.to_string(),
            opacity: opacity.to_string(),
        }
    }

    #[test]
    fn test_hidden_styles() {
        assert!(!is_visible_by_style(&style("none", "visible", "1"), 10.0, 10.0));
        assert!(!is_visible_by_style(&style("block", "hidden", "1"), 10.0, 10.0));
        assert!(!is_visible_by_style(&style("block", "visible", "0"), 10.0, 10.0));
    }

    #[test]
    fn test_opacity_is_literal_comparison() {
        assert!(is_visible_by_style(&style("block", "visible", "0.01"), 10.0, 10.0));
        // Not normalized numerically
        assert!(is_visible_by_style(&style("block", "visible", "0.0"), 10.0, 10.0));
    }

    #[test]
    fn test_collapsed_elements_are_hidden() {
        assert!(!is_visible_by_style(&ComputedStyle::default(), 0.0, 10.0));
        assert!(!is_visible_by_style(&ComputedStyle::default(), 10.0, 0.0));
        assert!(is_visible_by_style(&ComputedStyle::default(), 1.0, 1.0));
    }

    #[test]
    fn test_viewport_falls_back_to_window_size() {
        let viewport = ViewportMetrics {
            client_width: 0.0,
            client_height: 0.0,
            inner_width: 1024.0,
            inner_height: 768.0,
        };
        assert!(is_in_viewport(&BoundingBox::new(1000.0, 700.0, 50.0, 50.0), &viewport));
        assert!(!is_in_viewport(&BoundingBox::new(0.0, -9999.0, 50.0, 50.0), &viewport));
    }
}
