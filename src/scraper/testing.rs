//! In-memory page sessions serving canned HTML.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{document_matches, PageSession, SessionLauncher};
use crate::error::{Result, ServiceError};

#[derive(Clone, Default)]
pub struct MemoryLauncher {
    pages: Arc<HashMap<String, String>>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub launched: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl MemoryLauncher {
    pub fn new(pages: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn session(&self) -> MemoryPage {
        MemoryPage {
            launcher: self.clone(),
            current: None,
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for MemoryLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.session()))
    }
}

pub struct MemoryPage {
    launcher: MemoryLauncher,
    current: Option<String>,
}

#[async_trait]
impl PageSession for MemoryPage {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.launcher.visited.lock().unwrap().push(url.to_string());
        let html = self
            .launcher
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| ServiceError::ScrapeFailure(format!("navigation to {url} failed")))?;
        self.current = Some(html);
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> Result<bool> {
        let html = self.content().await?;
        document_matches(&html, selector)
    }

    async fn content(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| ServiceError::ScrapeFailure("no page loaded".to_string()))
    }

    async fn close(&mut self) {
        self.launcher.closed.fetch_add(1, Ordering::SeqCst);
    }
}
