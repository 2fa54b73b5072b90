//! Chrome DevTools-backed page sessions.
//!
//! One browser process is started (or attached to) on first use and shared;
//! every session is its own tab, closed when the session is released. A browser
//! whose event handler has stopped is replaced on the next launch.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{PageSession, SessionLauncher};
use crate::config::LauncherConfig;
use crate::error::{Result, ServiceError};

const MAX_POLL_INTERVAL: Duration = Duration::from_secs(1);

struct BrowserHandle {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

pub struct ChromiumLauncher {
    config: LauncherConfig,
    user_agent: String,
    browser: Mutex<Option<BrowserHandle>>,
}

impl ChromiumLauncher {
    pub fn new(config: LauncherConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
            browser: Mutex::new(None),
        }
    }

    async fn start(&self) -> Result<BrowserHandle> {
        let (browser, mut handler) = match &self.config {
            LauncherConfig::Local { executable, headless } => {
                let mut builder = BrowserConfig::builder()
                    .request_timeout(Duration::from_secs(30))
                    .arg(format!("--user-agent={}", self.user_agent))
                    .arg("--disable-blink-features=AutomationControlled")
                    .arg("--no-first-run")
                    .arg("--no-default-browser-check")
                    .arg("--mute-audio");

                if let Some(path) = executable {
                    builder = builder.chrome_executable(path);
                }
                if !headless {
                    builder = builder.with_head();
                }

                let config = builder.build().map_err(ServiceError::SessionUnavailable)?;
                tracing::info!("launching local browser");
                Browser::launch(config).await
            }
            LauncherConfig::Remote { ws_url } => {
                tracing::info!(%ws_url, "connecting to remote browser");
                Browser::connect(ws_url.clone()).await
            }
        }
        .map_err(|e| ServiceError::SessionUnavailable(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "browser handler event error");
                }
            }
            tracing::info!("browser handler task completed");
        });

        Ok(BrowserHandle { browser, handler })
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        let mut guard = self.browser.lock().await;

        // A finished handler means the browser went away; start over.
        let handle = match guard.take() {
            Some(handle) if !handle.handler.is_finished() => handle,
            stale => {
                if stale.is_some() {
                    tracing::warn!("browser connection lost, relaunching");
                    drop(stale);
                }
                self.start().await?
            }
        };
        let handle = guard.insert(handle);

        let page = handle
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ServiceError::SessionUnavailable(e.to_string()))?;

        Ok(Box::new(ChromiumSession { page, closed: false }))
    }
}

pub struct ChromiumSession {
    page: Page,
    closed: bool,
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| ServiceError::ScrapeFailure(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let start = Instant::now();
        let mut poll_interval = Duration::from_millis(100);

        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }

            if start.elapsed() >= timeout {
                tracing::debug!(selector, timeout_ms = timeout.as_millis() as u64, "selector wait timed out");
                return Ok(false);
            }

            tokio::time::sleep(poll_interval).await;
            poll_interval = (poll_interval * 2).min(MAX_POLL_INTERVAL);
        }
    }

    async fn exists(&mut self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn content(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ServiceError::ScrapeFailure(format!("failed to read page content: {e}")))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.page.clone().close().await {
            tracing::warn!(error = %e, "failed to close browser tab");
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        // Tab was not closed through `close`; finish it in the background.
        let page = self.page.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}
