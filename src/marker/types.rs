use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Attribute stamped on every marked element; its value is the element index
pub const INDEX_ATTRIBUTE: &str = "data-interactive-index";

/// Id of the scrollbar stylesheet injected into the page head
pub const SCROLLBAR_STYLE_ID: &str = "page-marker-scrollbar";

/// Scrollbar override injected once per document
pub const SCROLLBAR_CSS: &str = r#"
    ::-webkit-scrollbar {
        width: 10px;
    }
    ::-webkit-scrollbar-track {
        background: #27272a;
    }
    ::-webkit-scrollbar-thumb {
        background: #888;
        border-radius: 0.375rem;
    }
    ::-webkit-scrollbar-thumb:hover {
        background: #555;
    }
"#;

/// Bounding rectangle in viewport pixels, as `getBoundingClientRect` reports it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            x: left,
            y: top,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Overlap test against the `[0,0]-[width,height]` viewport rectangle
    pub fn intersects_viewport(&self, viewport_width: f64, viewport_height: f64) -> bool {
        self.top < viewport_height && self.left < viewport_width && self.bottom() > 0.0 && self.right() > 0.0
    }
}

/// The three computed style properties the visibility check reads.
/// Values are kept as the raw computed strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

/// Viewport dimensions from both the document element and the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMetrics {
    #[serde(default)]
    pub client_width: f64,
    #[serde(default)]
    pub client_height: f64,
    #[serde(default)]
    pub inner_width: f64,
    #[serde(default)]
    pub inner_height: f64,
}

impl ViewportMetrics {
    pub fn uniform(width: f64, height: f64) -> Self {
        Self {
            client_width: width,
            client_height: height,
            inner_width: width,
            inner_height: height,
        }
    }

    pub fn width(&self) -> f64 {
        self.client_width.max(self.inner_width)
    }

    pub fn height(&self) -> f64 {
        self.client_height.max(self.inner_height)
    }
}

/// An element under consideration during one scan
#[derive(Debug, Clone)]
pub struct Candidate<N> {
    pub element: N,
    pub bounding_box: BoundingBox,
    pub text: String,
    pub aria_label: String,
    pub element_type: String,
    pub index: Option<usize>,
}

/// Output record handed back to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub text: String,
    pub aria_label: String,
}

/// Handle to an overlay painted into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayId(pub Uuid);

impl OverlayId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_uses_origin_and_size() {
        let rect = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), (60.0, 45.0));
    }

    #[test]
    fn test_viewport_intersection_edges() {
        // Touching the top edge from above is not an overlap
        let above = BoundingBox::new(0.0, -50.0, 100.0, 50.0);
        assert!(!above.intersects_viewport(800.0, 600.0));

        let partially_visible = BoundingBox::new(-20.0, -20.0, 40.0, 40.0);
        assert!(partially_visible.intersects_viewport(800.0, 600.0));

        let right_of_viewport = BoundingBox::new(800.0, 10.0, 10.0, 10.0);
        assert!(!right_of_viewport.intersects_viewport(800.0, 600.0));
    }

    #[test]
    fn test_viewport_takes_larger_dimension() {
        let viewport = ViewportMetrics {
            client_width: 1265.0,
            client_height: 0.0,
            inner_width: 1280.0,
            inner_height: 720.0,
        };
        assert_eq!(viewport.width(), 1280.0);
        assert_eq!(viewport.height(), 720.0);
    }

    #[test]
    fn test_coordinate_serializes_agent_field_names() {
        let coordinate = Coordinate {
            x: 40.0,
            y: 10.0,
            element_type: "a".to_string(),
            text: "Submit now".to_string(),
            aria_label: String::new(),
        };
        let json = serde_json::to_value(&coordinate).unwrap();
        assert_eq!(json["type"], "a");
        assert_eq!(json["ariaLabel"], "");
        assert!(json.get("aria_label").is_none());
    }
}
