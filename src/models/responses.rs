use serde::Serialize;

use crate::marker::Coordinate;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub page_open: bool,
    /// Overlays the current session has painted
    pub overlays: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MarkResponse {
    pub bboxes: Vec<Coordinate>,
    /// Prompt-ready listing of the marked elements
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SelectorResponse {
    pub index: usize,
    pub selector: String,
}

#[derive(Debug, Serialize)]
pub struct GenericResponse {
    pub status: String,
}
