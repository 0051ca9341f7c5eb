//! Concurrency control for the upload path.
//!
//! Uploads hold a permit for the whole time the multipart body is being read and written to
//! disk. Requests beyond the concurrency limit queue for a bounded time; a full queue or an
//! expired wait is answered with HTTP 429.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::{LimitsConfig, UploadLimitsConfig};
use crate::errors::{Error, Result};

/// All resource limiters used by the router.
#[derive(Debug, Default, Clone)]
pub struct Limiters {
    /// None means unlimited uploads
    pub uploads: Option<Arc<UploadLimiter>>,
}

impl Limiters {
    pub fn new(config: &LimitsConfig) -> Self {
        Self {
            uploads: UploadLimiter::new(&config.uploads).map(Arc::new),
        }
    }
}

/// Bounded queue in front of a semaphore.
#[derive(Debug)]
pub struct UploadLimiter {
    semaphore: Arc<Semaphore>,
    waiting: AtomicUsize,
    /// None = unlimited waiting
    max_waiting: Option<usize>,
    max_wait: Duration,
}

impl UploadLimiter {
    /// Returns `None` when `max_concurrent` is 0 (unlimited uploads).
    pub fn new(config: &UploadLimitsConfig) -> Option<Self> {
        if config.max_concurrent == 0 {
            return None;
        }

        Some(Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            waiting: AtomicUsize::new(0),
            max_waiting: (config.max_waiting > 0).then_some(config.max_waiting),
            max_wait: config.max_wait,
        })
    }

    /// Number of requests currently queued for a slot
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Acquire an upload slot, waiting at most `max_wait`.
    pub async fn acquire(&self) -> Result<UploadPermit> {
        if let Ok(permit) = self.semaphore.clone().try_acquire_owned() {
            return Ok(UploadPermit { _permit: permit });
        }

        let _queued = self.join_queue()?;

        // A slot may have been released between the first attempt and joining the queue
        if let Ok(permit) = self.semaphore.clone().try_acquire_owned() {
            return Ok(UploadPermit { _permit: permit });
        }

        if self.max_wait.is_zero() {
            return Err(busy("Too many uploads in progress. Please retry later."));
        }

        match tokio::time::timeout(self.max_wait, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(UploadPermit { _permit: permit }),
            Ok(Err(_)) => Err(busy("Upload service temporarily unavailable.")),
            Err(_) => {
                tracing::debug!(max_wait = ?self.max_wait, "Upload slot wait timed out");
                Err(busy("Timed out waiting for upload slot. Please retry later."))
            }
        }
    }

    fn join_queue(&self) -> Result<QueueSlot<'_>> {
        let ahead = self.waiting.fetch_add(1, Ordering::SeqCst);
        let slot = QueueSlot { waiting: &self.waiting };

        if let Some(max_waiting) = self.max_waiting
            && ahead >= max_waiting
        {
            return Err(busy("Too many uploads in progress. Please retry later."));
        }
        Ok(slot)
    }
}

fn busy(message: &str) -> Error {
    Error::TooManyRequests {
        message: message.to_string(),
    }
}

/// Leaves the waiting queue on drop, whatever the outcome of the wait.
struct QueueSlot<'a> {
    waiting: &'a AtomicUsize,
}

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

/// RAII guard that releases the upload slot when dropped.
#[must_use]
pub struct UploadPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_concurrent: usize, max_waiting: usize, max_wait: Duration) -> UploadLimiter {
        UploadLimiter::new(&UploadLimitsConfig {
            max_concurrent,
            max_waiting,
            max_wait,
        })
        .unwrap()
    }

    #[test]
    fn test_zero_concurrency_means_unlimited() {
        let config = UploadLimitsConfig::default();
        assert!(UploadLimiter::new(&config).is_none());
        assert!(Limiters::new(&LimitsConfig::default()).uploads.is_none());
    }

    #[tokio::test]
    async fn test_acquire_when_available() {
        let limiter = limiter(2, 10, Duration::from_secs(60));

        let _a = limiter.acquire().await.unwrap();
        let _b = limiter.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn test_waiter_gets_released_slot() {
        let limiter = Arc::new(limiter(1, 10, Duration::from_secs(5)));
        let held = limiter.acquire().await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.waiting(), 1);

        drop(held);

        assert!(waiter.await.unwrap().is_ok());
        assert_eq!(limiter.waiting(), 0);
    }

    #[tokio::test]
    async fn test_full_queue_rejects() {
        let limiter = Arc::new(limiter(1, 1, Duration::from_secs(60)));
        let _held = limiter.acquire().await.unwrap();

        let _queued = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        match limiter.acquire().await {
            Err(Error::TooManyRequests { message }) => assert!(message.contains("Too many uploads")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected rejection"),
        }
        // the rejected request does not linger in the queue
        assert_eq!(limiter.waiting(), 1);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let limiter = limiter(1, 10, Duration::from_millis(200));
        let _held = limiter.acquire().await.unwrap();

        let start = std::time::Instant::now();
        let result = limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_millis(200));
        match result {
            Err(Error::TooManyRequests { message }) => assert!(message.contains("Timed out")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected timeout"),
        }
        assert_eq!(limiter.waiting(), 0);
    }

    #[tokio::test]
    async fn test_zero_wait_rejects_immediately() {
        let limiter = limiter(1, 10, Duration::ZERO);
        let _held = limiter.acquire().await.unwrap();

        let start = std::time::Instant::now();
        assert!(limiter.acquire().await.is_err());
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = limiter(1, 10, Duration::from_secs(1));
        {
            let _permit = limiter.acquire().await.unwrap();
        }
        assert!(limiter.acquire().await.is_ok());
    }
}
