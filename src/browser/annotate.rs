use anyhow::{anyhow, Result};
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use super::extractor::{apply_pass, capture_document, remove_live_overlays, PagePass};
use super::manager::BrowserManager;
use crate::config::Config;
use crate::marker::{Coordinate, MarkOptions, Palette, Session};

/// Screenshot of the marked page together with the element list it shows
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    /// Base64 PNG, overlays visible
    pub b64_image: String,
    pub bboxes: Vec<Coordinate>,
    pub url: String,
    pub captured_at: String,
}

#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub mark: MarkOptions,
    pub attempts: u32,
    pub retry_delay: Duration,
    pub settle_delay: Duration,
    pub load_timeout_ms: u64,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AnnotateOptions {
    fn from(config: &Config) -> Self {
        Self {
            mark: MarkOptions {
                palette: config.mark_seed.map(Palette::Seeded).unwrap_or_default(),
            },
            attempts: config.mark_attempts,
            retry_delay: Duration::from_millis(config.mark_retry_delay_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            load_timeout_ms: config.load_timeout_ms,
        }
    }
}

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
/// The last error is returned when every attempt fails.
pub async fn with_retries<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("No attempts made")))
}

/// Mark the page, screenshot it, then take the overlays down again.
///
/// Index attributes stay on the page so the caller can still address
/// element `k` with `[data-interactive-index='k']`.
pub async fn annotate(browser: &BrowserManager, session: &mut Session, options: &AnnotateOptions) -> Result<Annotation> {
    browser.wait_for_load(options.load_timeout_ms).await?;

    if !options.settle_delay.is_zero() {
        tokio::time::sleep(options.settle_delay).await;
    }

    let page = browser.page().await.ok_or_else(|| anyhow!("No page available"))?;

    // Capture fails while the page is still navigating; retry until it settles
    let doc = with_retries(options.attempts, options.retry_delay, || capture_document(&page)).await?;
    let pass = PagePass::mark(doc, session, &options.mark);
    let bboxes = apply_pass(&page, pass, session).await?;

    let screenshot = browser.screenshot().await?;

    // On failure the session keeps its overlays, so the next pass removes them
    if let Err(e) = remove_live_overlays(&page, session).await {
        tracing::warn!("Failed to remove overlays after screenshot: {}", e);
    }

    let url = browser.current_url().await.unwrap_or_default();

    tracing::info!("Annotated {} with {} elements", url, bboxes.len());

    Ok(Annotation {
        b64_image: base64::engine::general_purpose::STANDARD.encode(screenshot),
        bboxes,
        url,
        captured_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_with_retries_succeeds_after_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retries(5, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(anyhow!("still loading"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retries_returns_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retries(3, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(anyhow!("failure {}", n)) }
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);

        let result = tokio_test::block_on(with_retries(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(()) }
        }));

        tokio_test::assert_ok!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            mark_seed: Some(9),
            mark_attempts: 3,
            ..Config::default()
        };

        let options = AnnotateOptions::from(&config);
        assert_eq!(options.mark.palette, Palette::Seeded(9));
        assert_eq!(options.attempts, 3);
    }
}
