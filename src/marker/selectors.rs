use std::fmt;

/// One entry of the interactive element catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Matches by tag name
    Tag(&'static str),
    /// Matches elements carrying the attribute, any value
    HasAttribute(&'static str),
    /// Matches elements whose attribute equals the value exactly
    AttributeEquals(&'static str, &'static str),
}

impl Selector {
    /// Check the selector against a tag name and an attribute lookup
    pub fn matches<'a, F>(&self, tag: &str, attribute: F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        match self {
            Selector::Tag(name) => tag.eq_ignore_ascii_case(name),
            Selector::HasAttribute(name) => attribute(name).is_some(),
            Selector::AttributeEquals(name, value) => attribute(name) == Some(*value),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(name) => write!(f, "{}", name),
            Selector::HasAttribute(name) => write!(f, "[{}]", name),
            Selector::AttributeEquals(name, value) => write!(f, "[{}='{}']", name, value),
        }
    }
}

/// Elements an agent can click or type into
pub const INTERACTIVE_SELECTORS: &[Selector] = &[
    Selector::Tag("a"),
    Selector::Tag("button"),
    Selector::Tag("input"),
    Selector::Tag("textarea"),
    Selector::Tag("select"),
    Selector::AttributeEquals("role", "button"),
    Selector::AttributeEquals("role", "link"),
    Selector::AttributeEquals("role", "checkbox"),
    Selector::AttributeEquals("role", "radio"),
    Selector::AttributeEquals("role", "tab"),
    Selector::AttributeEquals("role", "menuitem"),
    Selector::HasAttribute("onclick"),
    Selector::AttributeEquals("tabindex", "0"),
];

/// The catalog as one comma-joined CSS selector list
pub fn selector_list(selectors: &[Selector]) -> String {
    selectors
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_selector_list_is_valid_css() {
        let css = selector_list(INTERACTIVE_SELECTORS);
        assert!(css.starts_with("a, button, input, textarea, select, "));
        assert!(css.contains("[role='menuitem']"));
        assert!(css.ends_with("[onclick], [tabindex='0']"));
    }

    #[test]
    fn test_attribute_selectors() {
        let mut attrs = HashMap::new();
        attrs.insert("tabindex", "-1");
        let lookup = |name: &str| attrs.get(name).copied();

        assert!(!Selector::AttributeEquals("tabindex", "0").matches("div", lookup));
        assert!(!Selector::HasAttribute("onclick").matches("div", lookup));
        assert!(Selector::HasAttribute("tabindex").matches("div", lookup));
        assert!(Selector::Tag("a").matches("A", lookup));
    }
}
