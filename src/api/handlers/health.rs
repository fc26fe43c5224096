use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::state::AppState;
use crate::models::HealthResponse;

/// Liveness plus whether a page is open and how many overlays it carries
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let page_open = state.browser.is_open().await;
    let overlays = state.session.lock().await.len();

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        page_open,
        overlays,
        timestamp: Utc::now().to_rfc3339(),
    })
}
