use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::browser::{self, Annotation};
use crate::error::{AppError, Result};
use crate::marker::{format_bboxes, index_selector};
use crate::models::{GenericResponse, MarkResponse, NavigateRequest, OpenPageRequest, SelectorResponse, Viewport};

use super::super::state::AppState;

fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::ValidationError("url must not be empty".to_string()));
    }
    if !(url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("file://")
        || url.starts_with("about:"))
    {
        return Err(AppError::ValidationError(format!("unsupported url scheme: {}", url)));
    }
    Ok(())
}

/// Launch (or relaunch) the browser on a URL
pub async fn open_page(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenPageRequest>,
) -> Result<Json<GenericResponse>> {
    validate_url(&request.url)?;

    let viewport = Viewport {
        width: request.viewport_width.unwrap_or(state.config.viewport.width),
        height: request.viewport_height.unwrap_or(state.config.viewport.height),
    };
    if viewport.width <= 0 || viewport.height <= 0 {
        return Err(AppError::ValidationError("viewport must be positive".to_string()));
    }

    let headless = request.headless.unwrap_or(state.config.headless);

    // Hold the session across the relaunch so no marking pass sees a half-open page
    let mut session = state.session.lock().await;
    state
        .browser
        .launch(&request.url, headless, viewport)
        .await
        .map_err(|e| AppError::BrowserError(e.to_string()))?;
    *session = Default::default();
    state.last_bboxes.lock().await.clear();

    Ok(Json(GenericResponse {
        status: "opened".to_string(),
    }))
}

pub async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<GenericResponse>> {
    validate_url(&request.url)?;

    if !state.browser.is_open().await {
        return Err(AppError::NoPage);
    }

    state
        .browser
        .navigate(&request.url)
        .await
        .map_err(|e| AppError::BrowserError(e.to_string()))?;

    // Overlays and stamps died with the old document
    state.reset_page_state().await;

    Ok(Json(GenericResponse {
        status: "navigated".to_string(),
    }))
}

/// Mark the page and leave the overlays painted
pub async fn mark(State(state): State<Arc<AppState>>) -> Result<Json<MarkResponse>> {
    let page = state.browser.page().await.ok_or(AppError::NoPage)?;

    let mut session = state.session.lock().await;
    let bboxes = browser::mark_live_page(&page, &mut session, &state.mark_options())
        .await
        .map_err(|e| AppError::BrowserError(e.to_string()))?;

    *state.last_bboxes.lock().await = bboxes.clone();

    Ok(Json(MarkResponse {
        description: format_bboxes(&bboxes),
        bboxes,
    }))
}

/// Mark, screenshot, and take the overlays down again
pub async fn annotate(State(state): State<Arc<AppState>>) -> Result<Json<Annotation>> {
    if !state.browser.is_open().await {
        return Err(AppError::NoPage);
    }

    let mut session = state.session.lock().await;
    let annotation = browser::annotate(&state.browser, &mut session, &state.annotate_options()).await?;

    *state.last_bboxes.lock().await = annotation.bboxes.clone();

    Ok(Json(annotation))
}

/// Remove overlays and index attributes
pub async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<GenericResponse>> {
    let page = state.browser.page().await.ok_or(AppError::NoPage)?;

    let mut session = state.session.lock().await;
    browser::clear_live_page(&page, &mut session)
        .await
        .map_err(|e| AppError::BrowserError(e.to_string()))?;

    state.last_bboxes.lock().await.clear();

    Ok(Json(GenericResponse {
        status: "cleared".to_string(),
    }))
}

/// Selector for element `index` from the most recent marking pass
pub async fn selector(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<SelectorResponse>> {
    let known = state.last_bboxes.lock().await.len();
    if index >= known {
        return Err(AppError::NotFound(format!(
            "no marked element with index {} ({} marked)",
            index, known
        )));
    }

    Ok(Json(SelectorResponse {
        index,
        selector: index_selector(index),
    }))
}

pub async fn close(State(state): State<Arc<AppState>>) -> Result<Json<GenericResponse>> {
    state.browser.close().await?;
    state.reset_page_state().await;

    Ok(Json(GenericResponse {
        status: "closed".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("file:///tmp/page.html").is_ok());
        assert!(validate_url("about:blank").is_ok());
        assert!(matches!(validate_url("  "), Err(AppError::ValidationError(_))));
        assert!(matches!(validate_url("javascript:alert(1)"), Err(AppError::ValidationError(_))));
    }
}
