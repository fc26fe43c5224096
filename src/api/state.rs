use tokio::sync::Mutex;

use crate::browser::{AnnotateOptions, BrowserManager};
use crate::config::Config;
use crate::marker::{Coordinate, MarkOptions, Session};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub browser: BrowserManager,
    /// Overlays painted into the open page. Held for the whole of a marking
    /// pass so passes never interleave.
    pub session: Mutex<Session>,
    /// Result of the most recent marking pass
    pub last_bboxes: Mutex<Vec<Coordinate>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            browser: BrowserManager::new(),
            session: Mutex::new(Session::new()),
            last_bboxes: Mutex::new(Vec::new()),
        }
    }

    pub fn mark_options(&self) -> MarkOptions {
        self.annotate_options().mark
    }

    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions::from(&self.config)
    }

    /// Forget everything tied to the previous page
    pub async fn reset_page_state(&self) {
        *self.session.lock().await = Session::new();
        self.last_bboxes.lock().await.clear();
    }
}
