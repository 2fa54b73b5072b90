use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ::scraper::{Html, Selector};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Result, ServiceError};

pub mod chromium;
pub mod metacritic;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

/// The minimal browser surface the page scraper needs.
///
/// Implementations render pages; extraction happens on the returned HTML so the
/// scraping logic can run against any backend, including canned documents.
#[async_trait]
pub trait PageSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Waits until `selector` matches, returning `false` if `timeout` elapses first.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Serialized DOM of the current page.
    async fn content(&mut self) -> Result<String>;

    async fn close(&mut self);

    /// Immediate probe, no waiting.
    async fn exists(&mut self, selector: &str) -> Result<bool> {
        let html = self.content().await?;
        document_matches(&html, selector)
    }
}

/// Produces fresh page sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageSession>>;
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ServiceError::ScrapeFailure(format!("invalid selector `{selector}`: {e}")))
}

pub(crate) fn document_matches(html: &str, selector: &str) -> Result<bool> {
    let selector = parse_selector(selector)?;
    Ok(Html::parse_document(html).select(&selector).next().is_some())
}

/// Caps the number of live browser sessions.
#[derive(Clone)]
pub struct SessionPool {
    launcher: Arc<dyn SessionLauncher>,
    permits: Arc<Semaphore>,
}

impl SessionPool {
    pub fn new(launcher: Arc<dyn SessionLauncher>, max_sessions: usize) -> Self {
        Self {
            launcher,
            permits: Arc::new(Semaphore::new(max_sessions.max(1))),
        }
    }

    /// Waits for a free slot, then launches a session in it.
    pub async fn acquire(&self) -> Result<SessionGuard> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ServiceError::SessionUnavailable(e.to_string()))?;

        let session = self.launcher.launch().await?;
        tracing::debug!(available = self.permits.available_permits(), "browser session acquired");

        Ok(SessionGuard {
            session,
            released: false,
            _permit: permit,
        })
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// A leased session. Call [`SessionGuard::release`] when done; dropping the
/// guard still frees the pool slot and lets the session clean itself up.
pub struct SessionGuard {
    session: Box<dyn PageSession>,
    released: bool,
    _permit: OwnedSemaphorePermit,
}

impl SessionGuard {
    pub fn page(&mut self) -> &mut dyn PageSession {
        self.session.as_mut()
    }

    pub async fn release(mut self) {
        self.session.close().await;
        self.released = true;
        tracing::debug!("browser session released");
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!("browser session dropped without release");
        }
    }
}
