use anyhow::{anyhow, Result};
use chromiumoxide::Page;
use std::time::Duration;
use tokio::time::timeout;

use super::scripts::{apply_script, snapshot_script};
use crate::dom::{Mutation, PageCapture, SnapshotDocument};
use crate::marker::{mark_page, Coordinate, MarkOptions, Session};

const CDP_TIMEOUT: Duration = Duration::from_secs(10);

/// Changes computed against a captured page, not yet applied to it.
///
/// The caller's session is only replaced by `commit` once the page has taken
/// the journal. A failed apply leaves the old session in place, so the next
/// pass still knows which overlays are on the page.
#[derive(Debug)]
pub struct PagePass<T> {
    pub journal: Vec<Mutation>,
    pub session: Session,
    pub output: T,
}

impl PagePass<Vec<Coordinate>> {
    /// Mark a captured page into a copy of `session`
    pub fn mark(mut doc: SnapshotDocument, session: &Session, options: &MarkOptions) -> Self {
        let mut next = session.clone();
        // Orphans from an apply that died half way are not in any session
        doc.remove_all_overlays();
        let coordinates = mark_page(&mut doc, &mut next, options);

        PagePass {
            journal: doc.take_journal(),
            session: next,
            output: coordinates,
        }
    }
}

impl<T> PagePass<T> {
    pub fn commit(self, session: &mut Session) -> T {
        *session = self.session;
        self.output
    }
}

impl PagePass<()> {
    /// Take down every overlay, keeping index attributes
    pub fn remove_overlays(session: &Session) -> Self {
        // Overlay removal is addressed by id, no capture needed
        let mut doc = SnapshotDocument::default();
        let mut next = session.clone();
        next.remove_overlays(&mut doc);
        doc.remove_all_overlays();

        PagePass {
            journal: doc.take_journal(),
            session: next,
            output: (),
        }
    }

    /// Take down every overlay and strip index attributes from a captured page
    pub fn clear(mut doc: SnapshotDocument, session: &Session) -> Self {
        let mut next = session.clone();
        next.clear(&mut doc);
        doc.remove_all_overlays();

        PagePass {
            journal: doc.take_journal(),
            session: next,
            output: (),
        }
    }
}

/// Capture the live page into an in-memory document
pub async fn capture_document(page: &Page) -> Result<SnapshotDocument> {
    let script = snapshot_script()?;
    let result = timeout(CDP_TIMEOUT, page.evaluate(script))
        .await
        .map_err(|_| anyhow!("Snapshot script timeout"))?
        .map_err(|e| anyhow!("Failed to evaluate snapshot script: {}", e))?;

    let capture: PageCapture = result
        .into_value()
        .map_err(|e| anyhow!("Failed to parse page capture: {}", e))?;

    tracing::debug!("Captured {} elements from page", capture.nodes.len());
    SnapshotDocument::from_capture(capture)
}

/// Replay recorded mutations into the live page
pub async fn apply_journal(page: &Page, journal: &[Mutation]) -> Result<()> {
    if journal.is_empty() {
        return Ok(());
    }

    let script = apply_script(journal)?;
    let result = timeout(CDP_TIMEOUT, page.evaluate(script))
        .await
        .map_err(|_| anyhow!("Apply script timeout"))?
        .map_err(|e| anyhow!("Failed to apply page mutations: {}", e))?;

    let applied: u64 = result.into_value().unwrap_or_default();
    tracing::debug!("Applied {}/{} page mutations", applied, journal.len());
    Ok(())
}

/// Apply a pass to the page and, only if that worked, commit it to `session`
pub async fn apply_pass<T>(page: &Page, pass: PagePass<T>, session: &mut Session) -> Result<T> {
    apply_journal(page, &pass.journal).await?;
    Ok(pass.commit(session))
}

/// Run the marking pipeline against the live page
pub async fn mark_live_page(page: &Page, session: &mut Session, options: &MarkOptions) -> Result<Vec<Coordinate>> {
    let doc = capture_document(page).await?;
    let pass = PagePass::mark(doc, session, options);
    apply_pass(page, pass, session).await
}

/// Remove all overlays from the page, leaving index attributes
pub async fn remove_live_overlays(page: &Page, session: &mut Session) -> Result<()> {
    let pass = PagePass::remove_overlays(session);
    apply_pass(page, pass, session).await
}

/// Remove overlays and index attributes from the page
pub async fn clear_live_page(page: &Page, session: &mut Session) -> Result<()> {
    let doc = capture_document(page).await?;
    let pass = PagePass::clear(doc, session);
    apply_pass(page, pass, session).await
}
