use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health, page};
use super::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // The sidecar drives a local browser; only local harnesses may call it
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost"),
            HeaderValue::from_static("http://127.0.0.1"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Page lifecycle
        .route("/page/open", post(page::open_page))
        .route("/page/navigate", post(page::navigate))
        .route("/page/close", post(page::close))
        // Marking
        .route("/page/mark", post(page::mark))
        .route("/page/annotate", post(page::annotate))
        .route("/page/clear", post(page::clear))
        .route("/page/selector/:index", get(page::selector))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
