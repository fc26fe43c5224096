use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::marker::overlay::OverlaySpec;
use crate::marker::selectors::Selector;
use crate::marker::{BoundingBox, ComputedStyle, Document, OverlayId, ViewportMetrics};

/// Index of an element in a `SnapshotDocument` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Child of an element: a text run or another element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    Text(String),
    Element(NodeId),
}

/// Element with the layout and style facts the marker reads
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub content: Vec<Content>,
    pub parent: Option<NodeId>,
    /// Element children in document order
    pub children: Vec<NodeId>,
    pub rect: BoundingBox,
    pub offset_width: f64,
    pub offset_height: f64,
    pub style: ComputedStyle,
}

/// A change made to the document, recorded so it can be replayed elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    AppendOverlay { id: OverlayId, spec: OverlaySpec },
    RemoveOverlay { id: OverlayId },
    /// Remove every overlay node, tracked or not
    RemoveAllOverlays,
    InjectStyle { id: String, css: String },
}

/// In-memory document: an element arena plus viewport, overlays and
/// injected stylesheets. Mutations are journaled.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDocument {
    elements: Vec<ElementData>,
    roots: Vec<NodeId>,
    viewport: ViewportMetrics,
    overlays: Vec<(OverlayId, OverlaySpec)>,
    styles: Vec<(String, String)>,
    journal: Vec<Mutation>,
}

impl SnapshotDocument {
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.elements.get(node.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in document (pre-)order
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            order.push(node);
            if let Some(element) = self.elements.get(node.0) {
                stack.extend(element.children.iter().rev().copied());
            }
        }

        order
    }

    /// First element, in document order, whose attribute equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        self.document_order()
            .into_iter()
            .find(|&node| self.attribute(node, name).as_deref() == Some(value))
    }

    pub fn overlays(&self) -> &[(OverlayId, OverlaySpec)] {
        &self.overlays
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    /// Drop every overlay, including ones painted by passes this document
    /// never saw
    pub fn remove_all_overlays(&mut self) {
        self.overlays.clear();
        self.journal.push(Mutation::RemoveAllOverlays);
    }

    fn push_element(&mut self, data: ElementData) -> NodeId {
        let id = NodeId(self.elements.len());
        match data.parent.and_then(|parent| self.elements.get_mut(parent.0)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        self.elements.push(data);
        id
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.elements.get(node.0) else {
            return;
        };
        for content in &element.content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    fn attribute_ref(&self, node: NodeId, name: &str) -> Option<&str> {
        self.elements.get(node.0)?.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

impl Document for SnapshotDocument {
    type Node = NodeId;

    fn query_selector_all(&self, selectors: &[Selector]) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|&node| {
                let tag = self.elements[node.0].tag.as_str();
                selectors
                    .iter()
                    .any(|selector| selector.matches(tag, |name| self.attribute_ref(node, name)))
            })
            .collect()
    }

    fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        self.document_order()
            .into_iter()
            .filter(|&node| self.attribute_ref(node, name).is_some())
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.elements.get(node.0).map(|e| e.tag.clone()).unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.attribute_ref(node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.elements.get_mut(node.0) else {
            return;
        };

        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attributes.push((name.to_string(), value.to_string())),
        }

        self.journal.push(Mutation::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(element) = self.elements.get_mut(node.0) else {
            return;
        };

        element.attributes.retain(|(key, _)| key != name);
        self.journal.push(Mutation::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.elements.get(node.0).map(|e| e.style.clone()).unwrap_or_default()
    }

    fn offset_size(&self, node: NodeId) -> (f64, f64) {
        self.elements
            .get(node.0)
            .map(|e| (e.offset_width, e.offset_height))
            .unwrap_or((0.0, 0.0))
    }

    fn bounding_client_rect(&self, node: NodeId) -> BoundingBox {
        self.elements.get(node.0).map(|e| e.rect).unwrap_or_default()
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.elements.get(node.0).and_then(|e| e.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.elements.get(parent.0).and_then(|e| e.parent);
        }
        false
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    fn append_overlay(&mut self, spec: &OverlaySpec) -> OverlayId {
        let id = OverlayId::new();
        self.overlays.push((id, spec.clone()));
        self.journal.push(Mutation::AppendOverlay {
            id,
            spec: spec.clone(),
        });
        id
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        // Journaled even when unknown here: the overlay may belong to the
        // live page this snapshot was captured from
        self.overlays.retain(|(existing, _)| *existing != id);
        self.journal.push(Mutation::RemoveOverlay { id });
    }

    fn has_style(&self, id: &str) -> bool {
        self.styles.iter().any(|(existing, _)| existing == id)
    }

    fn inject_style(&mut self, id: &str, css: &str) {
        if self.has_style(id) {
            return;
        }
        self.styles.push((id.to_string(), css.to_string()));
        self.journal.push(Mutation::InjectStyle {
            id: id.to_string(),
            css: css.to_string(),
        });
    }
}

/// Fluent construction of fixture elements
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    attributes: Vec<(String, String)>,
    content: Vec<BuilderContent>,
    rect: BoundingBox,
    offset_size: Option<(f64, f64)>,
    style: ComputedStyle,
}

#[derive(Debug, Clone)]
enum BuilderContent {
    Text(String),
    Element(ElementBuilder),
}

impl ElementBuilder {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            content: Vec::new(),
            rect: BoundingBox::default(),
            offset_size: None,
            style: ComputedStyle::default(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.content.push(BuilderContent::Text(text.to_string()));
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.content.push(BuilderContent::Element(child));
        self
    }

    pub fn rect(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.rect = BoundingBox::new(left, top, width, height);
        self
    }

    /// Override `offsetWidth`/`offsetHeight`; defaults to the rect size
    pub fn offset_size(mut self, width: f64, height: f64) -> Self {
        self.offset_size = Some((width, height));
        self
    }

    pub fn display(mut self, value: &str) -> Self {
        self.style.display = value.to_string();
        self
    }

    pub fn visibility(mut self, value: &str) -> Self {
        self.style.visibility = value.to_string();
        self
    }

    pub fn opacity(mut self, value: &str) -> Self {
        self.style.opacity = value.to_string();
        self
    }

    fn build_into(self, doc: &mut SnapshotDocument, parent: Option<NodeId>) -> NodeId {
        let (offset_width, offset_height) = self.offset_size.unwrap_or((self.rect.width, self.rect.height));
        let id = doc.push_element(ElementData {
            tag: self.tag,
            attributes: self.attributes,
            content: Vec::new(),
            parent,
            children: Vec::new(),
            rect: self.rect,
            offset_width,
            offset_height,
            style: self.style,
        });

        for content in self.content {
            let built = match content {
                BuilderContent::Text(text) => Content::Text(text),
                BuilderContent::Element(child) => Content::Element(child.build_into(doc, Some(id))),
            };
            doc.elements[id.0].content.push(built);
        }

        id
    }
}

/// Builds a `SnapshotDocument` from top-level element builders
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    viewport: ViewportMetrics,
    roots: Vec<ElementBuilder>,
}

impl DocumentBuilder {
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            viewport,
            roots: Vec::new(),
        }
    }

    pub fn element(mut self, element: ElementBuilder) -> Self {
        self.roots.push(element);
        self
    }

    pub fn build(self) -> SnapshotDocument {
        let mut doc = SnapshotDocument::new(self.viewport);
        for root in self.roots {
            root.build_into(&mut doc, None);
        }
        doc
    }
}

/// Element as captured from a live page.
///
/// The browser only captures catalog matches and stamped elements, so
/// `parent` is the nearest captured ancestor and `content` usually holds a
/// single text run with the element's whole `textContent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedNode {
    pub tag: String,
    pub parent: Option<usize>,
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub content: Vec<Content>,
    pub rect: BoundingBox,
    #[serde(default)]
    pub offset_width: f64,
    #[serde(default)]
    pub offset_height: f64,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

/// Whole-page capture returned by the browser snapshot script
#[derive(Debug, Clone, Deserialize)]
pub struct PageCapture {
    pub viewport: ViewportMetrics,
    #[serde(default)]
    pub styles: Vec<String>,
    pub nodes: Vec<CapturedNode>,
}

impl SnapshotDocument {
    /// Rebuild the element arena from a page capture.
    /// Node indices in the capture become `NodeId`s one to one.
    pub fn from_capture(capture: PageCapture) -> Result<Self> {
        let count = capture.nodes.len();
        let mut doc = SnapshotDocument::new(capture.viewport);

        for (index, node) in capture.nodes.into_iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= index {
                    return Err(anyhow!("Captured node {} has parent {} out of document order", index, parent));
                }
            }
            for content in &node.content {
                if let Content::Element(child) = content {
                    if child.0 >= count || child.0 <= index {
                        return Err(anyhow!("Captured node {} references invalid child {}", index, child.0));
                    }
                }
            }

            doc.push_element(ElementData {
                tag: node.tag,
                attributes: node.attributes,
                content: node.content,
                parent: node.parent.map(NodeId),
                children: Vec::new(),
                rect: node.rect,
                offset_width: node.offset_width,
                offset_height: node.offset_height,
                style: ComputedStyle {
                    display: node.display,
                    visibility: node.visibility,
                    opacity: node.opacity,
                },
            });
        }

        // Stylesheets already on the page only need to be known, not re-injected
        doc.styles = capture.styles.into_iter().map(|id| (id, String::new())).collect();

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::overlay::Color;
    use crate::marker::{mark_page, MarkOptions, Session, INDEX_ATTRIBUTE, INTERACTIVE_SELECTORS};

    fn fixture() -> SnapshotDocument {
        DocumentBuilder::new(ViewportMetrics::uniform(800.0, 600.0))
            .element(
                ElementBuilder::new("body")
                    .rect(0.0, 0.0, 800.0, 600.0)
                    .text("Hello ")
                    .child(ElementBuilder::new("a").attr("id", "link").text("one"))
                    .text(" world ")
                    .child(
                        ElementBuilder::new("div")
                            .attr("role", "button")
                            .child(ElementBuilder::new("span").text("two")),
                    ),
            )
            .build()
    }

    #[test]
    fn test_text_content_follows_document_order() {
        let doc = fixture();
        let body = NodeId(0);
        assert_eq!(doc.text_content(body), "Hello one world two");
    }

    #[test]
    fn test_query_selector_all_in_document_order() {
        let doc = fixture();
        let matches = doc.query_selector_all(INTERACTIVE_SELECTORS);
        let tags: Vec<String> = matches.iter().map(|&n| doc.tag_name(n)).collect();
        assert_eq!(tags, vec!["a", "div"]);
    }

    #[test]
    fn test_contains_is_strict_ancestry() {
        let doc = fixture();
        let body = NodeId(0);
        let link = doc.find_by_attribute("id", "link").unwrap();
        assert!(doc.contains(body, link));
        assert!(!doc.contains(link, body));
        assert!(!doc.contains(link, link));
    }

    #[test]
    fn test_mutations_are_journaled() {
        let mut doc = fixture();
        let link = doc.find_by_attribute("id", "link").unwrap();

        doc.set_attribute(link, "target", "_self");
        doc.set_attribute(link, "target", "_self");
        doc.remove_attribute(link, "target");
        doc.inject_style("s", "a {}");
        doc.inject_style("s", "a {}");

        assert_eq!(doc.attribute(link, "target"), None);
        assert_eq!(doc.style_count(), 1);
        assert_eq!(doc.journal().len(), 4);
        assert_eq!(doc.take_journal().len(), 4);
        assert!(doc.journal().is_empty());
    }

    #[test]
    fn test_from_capture() {
        let json = serde_json::json!({
            "viewport": {"clientWidth": 1265, "clientHeight": 700, "innerWidth": 1280, "innerHeight": 720},
            "styles": ["page-marker-scrollbar"],
            "nodes": [
                {
                    "tag": "BODY", "parent": null, "attributes": [],
                    "content": [{"element": 1}],
                    "rect": {"left": 0, "top": 0, "width": 1265, "height": 700, "x": 0, "y": 0},
                    "offsetWidth": 1265, "offsetHeight": 700,
                    "display": "block", "visibility": "visible", "opacity": "1"
                },
                {
                    "tag": "BUTTON", "parent": 0, "attributes": [["aria-label", "Close"]],
                    "content": [{"text": "x"}],
                    "rect": {"left": 5, "top": 5, "width": 20, "height": 20, "x": 5, "y": 5},
                    "offsetWidth": 20, "offsetHeight": 20,
                    "display": "inline-block", "visibility": "visible", "opacity": "1"
                }
            ]
        });

        let capture: PageCapture = serde_json::from_value(json).unwrap();
        let doc = SnapshotDocument::from_capture(capture).unwrap();

        assert_eq!(doc.len(), 2);
        assert!(doc.has_style("page-marker-scrollbar"));
        assert_eq!(doc.viewport().width(), 1280.0);
        assert!(doc.contains(NodeId(0), NodeId(1)));
        assert_eq!(doc.attribute(NodeId(1), "aria-label").as_deref(), Some("Close"));
        assert_eq!(doc.text_content(NodeId(0)), "x");
    }

    #[test]
    fn test_from_capture_of_matches_only() {
        // Captured matches link to their nearest captured ancestor; the
        // wrapper divs between them are not part of the capture
        let json = serde_json::json!({
            "viewport": {"clientWidth": 1280, "clientHeight": 720, "innerWidth": 1280, "innerHeight": 720},
            "nodes": [
                {
                    "tag": "A", "parent": null, "attributes": [["href", "/cart"]],
                    "content": [{"text": "Cart  Buy now"}],
                    "rect": {"left": 0, "top": 0, "width": 300, "height": 80, "x": 0, "y": 0},
                    "offsetWidth": 300, "offsetHeight": 80,
                    "display": "block", "visibility": "visible", "opacity": "1"
                },
                {
                    "tag": "BUTTON", "parent": 0, "attributes": [],
                    "content": [{"text": "Buy now"}],
                    "rect": {"left": 10, "top": 40, "width": 100, "height": 30, "x": 10, "y": 40},
                    "offsetWidth": 100, "offsetHeight": 30,
                    "display": "inline-block", "visibility": "visible", "opacity": "1"
                },
                {
                    "tag": "DIV", "parent": null, "attributes": [["data-interactive-index", "4"]],
                    "content": [{"text": "stale"}],
                    "rect": {"left": 0, "top": 100, "width": 50, "height": 50, "x": 0, "y": 100},
                    "offsetWidth": 50, "offsetHeight": 50,
                    "display": "block", "visibility": "visible", "opacity": "1"
                }
            ]
        });

        let capture: PageCapture = serde_json::from_value(json).unwrap();
        let mut doc = SnapshotDocument::from_capture(capture).unwrap();

        assert_eq!(doc.document_order(), vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert!(doc.contains(NodeId(0), NodeId(1)));
        assert_eq!(doc.text_content(NodeId(0)), "Cart  Buy now");

        let mut session = Session::new();
        let bboxes = mark_page(&mut doc, &mut session, &MarkOptions::default());

        assert_eq!(bboxes.len(), 1);
        assert_eq!(bboxes[0].element_type, "button");
        assert_eq!(bboxes[0].text, "Buy now");
        assert_eq!(doc.query_attribute(INDEX_ATTRIBUTE), vec![NodeId(1)]);
    }

    #[test]
    fn test_remove_all_overlays_is_journaled() {
        let mut doc = fixture();
        doc.append_overlay(&OverlaySpec::new(0, &BoundingBox::new(0.0, 0.0, 10.0, 10.0), Color::from_rgb(0)));
        doc.take_journal();

        doc.remove_all_overlays();

        assert_eq!(doc.overlay_count(), 0);
        assert_eq!(doc.journal(), &[Mutation::RemoveAllOverlays]);
    }

    #[test]
    fn test_from_capture_rejects_forward_parent() {
        let json = serde_json::json!({
            "viewport": {"innerWidth": 100, "innerHeight": 100},
            "nodes": [{
                "tag": "DIV", "parent": 3,
                "rect": {"left": 0, "top": 0, "width": 1, "height": 1, "x": 0, "y": 0},
                "display": "block", "visibility": "visible", "opacity": "1"
            }]
        });

        let capture: PageCapture = serde_json::from_value(json).unwrap();
        assert!(SnapshotDocument::from_capture(capture).is_err());
    }
}
