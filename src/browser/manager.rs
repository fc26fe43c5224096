use anyhow::{anyhow, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::scripts::READY_STATE_SCRIPT;
use crate::models::Viewport;

/// Owns the browser and the single page being marked
pub struct BrowserManager {
    browser: Arc<Mutex<Option<Browser>>>,
    page: Arc<Mutex<Option<Page>>>,
    /// Serializes launches so two requests never spawn two Chromes
    launch_lock: Mutex<()>,
}

impl BrowserManager {
    pub fn new() -> Self {
        Self {
            browser: Arc::new(Mutex::new(None)),
            page: Arc::new(Mutex::new(None)),
            launch_lock: Mutex::new(()),
        }
    }

    /// Launch browser and navigate to URL, closing any previous instance
    pub async fn launch(&self, url: &str, headless: bool, viewport: Viewport) -> Result<()> {
        let _launch_guard = self.launch_lock.lock().await;

        self.close().await.ok();

        let mut config = BrowserConfig::builder().window_size(viewport.width as u32, viewport.height as u32);

        if !headless {
            config = config.with_head();
        }

        config = config
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-default-apps")
            .arg("--disable-extensions");

        let config = config.build().map_err(|e| anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = timeout(Duration::from_secs(30), Browser::launch(config))
            .await
            .map_err(|_| anyhow!("Browser launch timeout (30s) - Chrome may not be installed or is unresponsive"))?
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                tracing::trace!("Browser event: {:?}", event);
            }
        });

        let default_pages = browser.pages().await.map_err(|e| anyhow!("Failed to get pages: {}", e))?;

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| anyhow!("Failed to create page: {}", e))?;

        // Close the blank startup tabs so only the marked page remains
        for default_page in default_pages {
            if let Err(e) = default_page.close().await {
                tracing::warn!("Failed to close default page: {}", e);
            }
        }

        let emulation_params = SetDeviceMetricsOverrideParams::builder()
            .width(viewport.width as i64)
            .height(viewport.height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(|e| anyhow!("Failed to build viewport params: {}", e))?;

        page.execute(emulation_params)
            .await
            .map_err(|e| anyhow!("Failed to set viewport: {}", e))?;

        *self.browser.lock().await = Some(browser);
        *self.page.lock().await = Some(page);

        tracing::info!(
            "Browser launched ({}x{}, headless: {}) and navigated to {}",
            viewport.width,
            viewport.height,
            headless,
            url
        );
        Ok(())
    }

    /// Whether a page is currently open
    pub async fn is_open(&self) -> bool {
        self.page.lock().await.is_some()
    }

    /// Get the underlying page
    pub async fn page(&self) -> Option<Page> {
        self.page.lock().await.clone()
    }

    async fn require_page(&self) -> Result<Page> {
        self.page().await.ok_or_else(|| anyhow!("No page available"))
    }

    /// Get current page URL
    pub async fn current_url(&self) -> Result<String> {
        let page = self.require_page().await?;

        page.url()
            .await
            .map_err(|e| anyhow!("Failed to get URL: {}", e))?
            .ok_or_else(|| anyhow!("URL is None"))
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<()> {
        let page = self.require_page().await?;

        page.goto(url)
            .await
            .map_err(|e| anyhow!("Failed to navigate to {}: {}", url, e))?;

        tracing::info!("Navigated to {}", url);
        Ok(())
    }

    /// Wait until `document.readyState` is `complete`
    pub async fn wait_for_load(&self, timeout_ms: u64) -> Result<()> {
        let page = self.require_page().await?;

        let limit = Duration::from_millis(timeout_ms);
        let start = Instant::now();

        loop {
            let state = page
                .evaluate(READY_STATE_SCRIPT)
                .await
                .ok()
                .and_then(|r| r.into_value::<String>().ok());

            if state.as_deref() == Some("complete") {
                return Ok(());
            }

            if start.elapsed() > limit {
                return Err(anyhow!(
                    "Timeout waiting for page load after {}ms (readyState: {})",
                    timeout_ms,
                    state.unwrap_or_else(|| "unknown".to_string())
                ));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Take a PNG screenshot of the visible viewport
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        let page = self.require_page().await?;

        page.screenshot(ScreenshotParams::builder().format(CaptureScreenshotFormat::Png).build())
            .await
            .map_err(|e| anyhow!("Failed to take screenshot: {}", e))
    }

    /// Close the browser
    pub async fn close(&self) -> Result<()> {
        let mut page_guard = self.page.lock().await;
        let mut browser_guard = self.browser.lock().await;

        if let Some(page) = page_guard.take() {
            let _ = page.close().await;
        }

        if let Some(mut browser) = browser_guard.take() {
            let _ = browser.close().await;
        }

        tracing::info!("Browser closed");
        Ok(())
    }
}

impl Default for BrowserManager {
    fn default() -> Self {
        Self::new()
    }
}
