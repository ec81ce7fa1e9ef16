//! Admission gate bounding concurrently running tasks.

use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bounds the number of simultaneously running tasks of one class.
///
/// Tasks submitted through [`run`](Self::run) wait for a slot in submission
/// order (the underlying semaphore is fair) and release it when they finish,
/// whether they succeed or fail. Clones share the same slots.
#[derive(Debug, Clone)]
pub struct Limiter {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

impl Limiter {
    /// Create a limiter admitting at most `max_concurrent` tasks at once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `max_concurrent` is zero or exceeds the
    /// semaphore's permit limit.
    pub fn new(max_concurrent: usize) -> Result<Self> {
        if max_concurrent == 0 {
            return Err(Error::Config(
                "concurrency limit must be at least 1".to_string(),
            ));
        }
        if max_concurrent > Semaphore::MAX_PERMITS {
            return Err(Error::Config(format!(
                "concurrency limit {max_concurrent} exceeds the maximum of {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Ok(Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        })
    }

    /// Run `task` once a slot is free.
    ///
    /// The task's own result is returned unchanged; a failing task does not
    /// affect any other task waiting on or running under this limiter.
    pub async fn run<F, Fut, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| Error::ResourceLimited("concurrency limiter closed".into()))?;
        task().await
    }

    /// Configured slot count.
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
