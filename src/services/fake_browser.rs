use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::error::RenderError;

use super::{BrowserLauncher, BrowserSession};

/// In-memory browser that serves canned markup and counts its sessions.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    html: String,
    launch_failure: Option<RenderError>,
    snapshot_failure: Option<RenderError>,
    close_failure: bool,
    delay: Option<Duration>,
    launch_delay: Option<Duration>,
    close_delay: Option<Duration>,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    open: Arc<AtomicUsize>,
    peak_open: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn serving(html: &str) -> Self {
        FakeBrowser {
            html: html.to_string(),
            ..Default::default()
        }
    }

    pub fn failing(err: RenderError) -> Self {
        FakeBrowser {
            snapshot_failure: Some(err),
            ..Default::default()
        }
    }

    pub fn unlaunchable(reason: &str) -> Self {
        FakeBrowser {
            launch_failure: Some(RenderError::Launch(reason.to_string())),
            ..Default::default()
        }
    }

    pub fn slow(html: &str, delay: Duration) -> Self {
        FakeBrowser {
            html: html.to_string(),
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn with_close_failure(mut self) -> Self {
        self.close_failure = true;
        self
    }

    /// The session counts as open before the slow launch answers.
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = Some(delay);
        self
    }

    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn peak_open_sessions(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

struct FakeSession {
    browser: FakeBrowser,
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        if let Some(err) = &self.launch_failure {
            return Err(err.clone());
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(open, Ordering::SeqCst);

        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }

        Ok(Box::new(FakeSession {
            browser: self.clone(),
        }))
    }

    async fn is_ready(&self) -> bool {
        self.launch_failure.is_none()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn snapshot(&mut self, url: &str) -> Result<String, RenderError> {
        if let Ok(mut visited) = self.browser.visited.lock() {
            visited.push(url.to_string());
        }
        if let Some(delay) = self.browser.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.browser.snapshot_failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.browser.html.clone()),
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if let Some(delay) = self.browser.close_delay {
            tokio::time::sleep(delay).await;
        }
        self.browser.open.fetch_sub(1, Ordering::SeqCst);
        self.browser.closes.fetch_add(1, Ordering::SeqCst);

        match self.browser.close_failure {
            true => Err(RenderError::Release("browser already gone".to_string())),
            false => Ok(()),
        }
    }
}
