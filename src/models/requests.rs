use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OpenPageRequest {
    pub url: String,
    /// Falls back to the configured mode when absent
    pub headless: Option<bool>,
    pub viewport_width: Option<i32>,
    pub viewport_height: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub url: String,
}
