use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::error::RenderError;

/// Caps how many browser sessions are open at once and how many requests may
/// wait for one. Past `queue_depth` waiters new requests are turned away.
///
/// Permits are owned: one goes back only after its browser session is closed.
pub struct RenderPool {
    sessions: Arc<Semaphore>,
    waiting: AtomicUsize,
    queue_depth: usize,
}

struct QueueTicket<'a>(&'a AtomicUsize);

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RenderPool {
    pub fn new(max_sessions: usize, queue_depth: usize) -> Self {
        RenderPool {
            sessions: Arc::new(Semaphore::new(max_sessions.max(1))),
            waiting: AtomicUsize::new(0),
            queue_depth,
        }
    }

    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, RenderError> {
        match Arc::clone(&self.sessions).try_acquire_owned() {
            Ok(permit) => return Ok(permit),
            Err(TryAcquireError::Closed) => return Err(RenderError::Closed),
            Err(TryAcquireError::NoPermits) => {}
        }

        let queued = self.waiting.fetch_add(1, Ordering::SeqCst);
        let _ticket = QueueTicket(&self.waiting);
        if queued >= self.queue_depth {
            log::warn!("Render queue is full with {} waiting requests", queued);
            return Err(RenderError::Overloaded { queued });
        }

        Arc::clone(&self.sessions)
            .acquire_owned()
            .await
            .map_err(|_| RenderError::Closed)
    }

    pub fn available(&self) -> usize {
        self.sessions.available_permits()
    }

    pub fn queued(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Fails every waiting and future request with `RenderError::Closed`.
    pub fn close(&self) {
        self.sessions.close();
    }
}
