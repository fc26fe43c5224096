use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use page_marker::api::{routes::create_router, state::AppState};
use page_marker::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let state = Arc::new(AppState::new(config.clone()));

    if let Some(url) = &config.start_url {
        if let Err(e) = state.browser.launch(url, config.headless, config.viewport).await {
            tracing::error!("Failed to open start page {}: {}", url, e);
        }
    }

    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Page marker sidecar starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    state.browser.close().await.ok();
    Ok(())
}
