//! Global request pacing shared by every worker

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between consecutive outbound requests
///
/// The check of the last request time, the sleep, and the update of the
/// timestamp all happen while holding one lock, so overlapping callers are
/// released strictly one at a time, at least `delay` apart.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a rate limiter with the given minimum delay between requests
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until the next request may be issued and claims that slot
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}
