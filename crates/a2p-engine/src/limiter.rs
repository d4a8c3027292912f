//! Concurrency limiter
//!
//! At most `capacity` units of work run at once. The permit is taken before
//! the task is spawned, so queued work starts in submission order; tokio's
//! semaphore hands out permits first come, first served.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct Limiter {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl Limiter {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a free slot, then spawn `work` on it
    ///
    /// The slot is released when `work` finishes, panics included.
    pub async fn submit<F>(&self, work: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        // never closed, so the permit is always granted
        let permit = self.permits.clone().acquire_owned().await.ok();
        tokio::spawn(async move {
            let _permit = permit;
            work.await
        })
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CONCURRENCY)
    }
}
