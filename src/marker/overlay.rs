use rand::distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::Document;
use super::session::Session;
use super::types::{BoundingBox, Candidate};

/// Above everything a page can stack
pub const MAX_Z_INDEX: &str = "2147483647";

/// Ordered CSS property/value pairs, property names in CSS (kebab) case
pub type StyleDeclarations = Vec<(String, String)>;

/// Declarative description of one marker: a fixed box over the element
/// plus a numbered label at its top-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySpec {
    pub container_style: StyleDeclarations,
    pub label_style: StyleDeclarations,
    pub label_text: String,
}

impl OverlaySpec {
    pub fn new(index: usize, rect: &BoundingBox, color: Color) -> Self {
        let container_style = declarations(&[
            ("outline", format!("2px dashed {}", color)),
            ("position", "fixed".to_string()),
            ("left", format!("{}px", rect.left)),
            ("top", format!("{}px", rect.top)),
            ("width", format!("{}px", rect.width)),
            ("height", format!("{}px", rect.height)),
            ("pointer-events", "none".to_string()),
            ("box-sizing", "border-box".to_string()),
            ("z-index", MAX_Z_INDEX.to_string()),
        ]);

        let label_style = declarations(&[
            ("position", "absolute".to_string()),
            ("top", "-19px".to_string()),
            ("left", "0px".to_string()),
            ("background", color.to_string()),
            ("color", "white".to_string()),
            ("padding", "2px 4px".to_string()),
            ("font-size", "12px".to_string()),
            ("border-radius", "2px".to_string()),
        ]);

        Self {
            container_style,
            label_style,
            label_text: index.to_string(),
        }
    }

    pub fn container_property(&self, name: &str) -> Option<&str> {
        lookup(&self.container_style, name)
    }

    pub fn label_property(&self, name: &str) -> Option<&str> {
        lookup(&self.label_style, name)
    }
}

fn declarations(pairs: &[(&str, String)]) -> StyleDeclarations {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn lookup<'a>(style: &'a StyleDeclarations, name: &str) -> Option<&'a str> {
    style
        .iter()
        .find(|(property, _)| property == name)
        .map(|(_, value)| value.as_str())
}

/// 24-bit RGB marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(u32);

impl Color {
    pub const MAX: u32 = 0x00FF_FFFF;

    pub fn from_rgb(rgb: u32) -> Self {
        Self(rgb & Self::MAX)
    }

    /// Spread an arbitrary seed over the color space
    pub fn from_seed(seed: u32) -> Self {
        let mut h = seed.wrapping_mul(0x9E37_79B1);
        h ^= h >> 15;
        h = h.wrapping_mul(0x85EB_CA6B);
        h ^= h >> 13;
        Self::from_rgb(h)
    }

    pub fn random() -> Self {
        let dist = Uniform::new_inclusive(0u32, Self::MAX).expect("color range is non-empty");
        Self(dist.sample(&mut rand::rng()))
    }

    pub fn rgb(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Where marker colors come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Fresh random color per marker
    #[default]
    Random,
    /// Colors derived from a seed and the marker index, stable across runs
    Seeded(u32),
}

impl Palette {
    pub fn color_for(&self, index: usize) -> Color {
        match self {
            Palette::Random => Color::random(),
            Palette::Seeded(seed) => Color::from_seed(seed.wrapping_add(index as u32)),
        }
    }
}

/// Paint one marker per indexed candidate and track it in the session
pub fn render_overlays<D: Document>(
    doc: &mut D,
    candidates: &[Candidate<D::Node>],
    palette: Palette,
    session: &mut Session,
) {
    for candidate in candidates {
        let Some(index) = candidate.index else {
            continue;
        };

        let spec = OverlaySpec::new(index, &candidate.bounding_box, palette.color_for(index));
        let id = doc.append_overlay(&spec);
        session.track(id);
    }

    tracing::debug!("Painted {} overlay markers", session.len());
}
