use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::OwnedSemaphorePermit,
    task::JoinHandle,
    time::{timeout, timeout_at, Instant},
};

use crate::error::RenderError;

use super::RenderPool;

/// One live browser, good for exactly one page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`, lets its scripts run and returns the resulting markup.
    async fn snapshot(&mut self, url: &str) -> Result<String, RenderError>;

    async fn close(&mut self) -> Result<(), RenderError>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError>;

    async fn is_ready(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
}

const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);

async fn close_session(mut session: Box<dyn BrowserSession>, limit: Duration, url: &str) {
    match timeout(limit, session.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("Browser session for {} did not close cleanly: {}", url, e),
        Err(_) => log::warn!(
            "Browser session for {} did not close within {:?}, giving up on it",
            url,
            limit
        ),
    }
}

fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => log::error!("Abandoned browser session outside a runtime, leaking it"),
    }
}

/// A launch running in its own task. If the request stops waiting for it,
/// the task is left to finish and whatever session it opens gets closed.
struct PendingLaunch {
    handle: Option<JoinHandle<Result<Box<dyn BrowserSession>, RenderError>>>,
    permit: Option<OwnedSemaphorePermit>,
    release_timeout: Duration,
    url: String,
}

impl PendingLaunch {
    async fn finish(&mut self) -> Result<SessionGuard, RenderError> {
        let joined = match self.handle.as_mut() {
            Some(handle) => handle.await,
            None => return Err(RenderError::Closed),
        };
        self.handle = None;
        let permit = self.permit.take();

        match joined {
            Ok(Ok(session)) => Ok(SessionGuard {
                session: Some(session),
                permit,
                release_timeout: self.release_timeout,
                url: self.url.clone(),
            }),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(RenderError::Launch(format!("launch task failed: {}", e))),
        }
    }
}

impl Drop for PendingLaunch {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let permit = self.permit.take();
            let release_timeout = self.release_timeout;
            let url = self.url.clone();

            spawn_detached(async move {
                if let Ok(Ok(session)) = handle.await {
                    log::warn!("Closing browser session launched for abandoned {}", url);
                    close_session(session, release_timeout, &url).await;
                }
                drop(permit);
            });
        }
    }
}

/// An open session and the pool permit it occupies. The permit is returned
/// only after the session is closed, also when the render future is dropped.
struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
    permit: Option<OwnedSemaphorePermit>,
    release_timeout: Duration,
    url: String,
}

impl SessionGuard {
    async fn release(&mut self) {
        if let Some(session) = self.session.take() {
            close_session(session, self.release_timeout, &self.url).await;
        }
        drop(self.permit.take());
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            let permit = self.permit.take();
            let release_timeout = self.release_timeout;
            let url = self.url.clone();

            spawn_detached(async move {
                close_session(session, release_timeout, &url).await;
                drop(permit);
            });
        }
    }
}

pub struct Renderer {
    launcher: Arc<dyn BrowserLauncher>,
    pool: RenderPool,
    timeout: Duration,
    release_timeout: Duration,
}

impl Renderer {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, pool: RenderPool, timeout: Duration) -> Self {
        Renderer {
            launcher,
            pool,
            timeout,
            release_timeout: RELEASE_TIMEOUT,
        }
    }

    /// Upper bound on closing one session, separate from the request deadline.
    pub fn with_release_timeout(mut self, release_timeout: Duration) -> Self {
        self.release_timeout = release_timeout;
        self
    }

    /// Renders `url` in a fresh browser session under the request deadline.
    /// A session that was opened is closed on every path out of here.
    pub async fn render(&self, url: &str) -> Result<RenderedDocument, RenderError> {
        let deadline = Instant::now() + self.timeout;

        let permit = timeout_at(deadline, self.pool.acquire())
            .await
            .map_err(|_| RenderError::Timeout(self.timeout))??;

        let launcher = Arc::clone(&self.launcher);
        let mut launch = PendingLaunch {
            handle: Some(tokio::spawn(async move { launcher.launch().await })),
            permit: Some(permit),
            release_timeout: self.release_timeout,
            url: url.to_string(),
        };
        let mut guard = timeout_at(deadline, launch.finish())
            .await
            .map_err(|_| RenderError::Timeout(self.timeout))??;

        let snapshot = match guard.session.as_mut() {
            Some(session) => match timeout_at(deadline, session.snapshot(url)).await {
                Ok(result) => result,
                Err(_) => Err(RenderError::Timeout(self.timeout)),
            },
            None => Err(RenderError::Closed),
        };

        guard.release().await;

        snapshot.map(|html| RenderedDocument { html })
    }

    pub async fn is_ready(&self) -> bool {
        self.launcher.is_ready().await
    }

    pub fn pool(&self) -> &RenderPool {
        &self.pool
    }
}
