use regex::Regex;
use std::sync::OnceLock;

use super::document::Document;
use super::selectors::Selector;
use super::types::Candidate;
use super::visibility::is_element_visible;

fn whitespace_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s{2,}").expect("whitespace regex must compile"))
}

/// Trim and collapse runs of two or more whitespace characters to one space.
/// A lone newline or tab between words is left as is.
pub fn normalize_text(raw: &str) -> String {
    whitespace_run_re().replace_all(raw.trim(), " ").into_owned()
}

/// Collect visible elements matching the catalog, in document order
pub fn scan_candidates<D: Document>(doc: &D, selectors: &[Selector]) -> Vec<Candidate<D::Node>> {
    let matched = doc.query_selector_all(selectors);
    let total = matched.len();

    let candidates: Vec<_> = matched
        .into_iter()
        .filter(|&node| is_element_visible(doc, node))
        .map(|node| Candidate {
            element: node,
            bounding_box: doc.bounding_client_rect(node),
            text: normalize_text(&doc.text_content(node)),
            aria_label: doc.attribute(node, "aria-label").unwrap_or_default(),
            element_type: doc.tag_name(node).to_lowercase(),
            index: None,
        })
        .collect();

    tracing::debug!(
        "Candidate scan: {} matched, {} visible",
        total,
        candidates.len()
    );

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Submit  now \n"), "Submit now");
        assert_eq!(normalize_text("a \n\t b"), "a b");
        assert_eq!(normalize_text("line\nbreak"), "line\nbreak");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }
}
