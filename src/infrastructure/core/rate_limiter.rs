use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Fixed-interval pacer for outbound calls.
///
/// Guarantees at least `min_interval` between the starts of two successive
/// calls. The first call never waits. A zero interval disables pacing, which
/// is what tests use.
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.min_interval.is_zero()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the next call is allowed, then records it.
    pub async fn wait(&self) {
        if !self.is_enabled() {
            return;
        }

        // Held across the sleep so concurrent callers queue up behind each other.
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!("RequestPacer: waiting {:?} before next request", delay);
                sleep(delay).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn test_pacer_enforces_interval() {
        let pacer = RequestPacer::new(Duration::from_millis(200));
        let start = StdInstant::now();

        pacer.wait().await;
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "First request should be immediate"
        );

        pacer.wait().await;
        assert!(
            start.elapsed() >= Duration::from_millis(190),
            "Second request should wait ~200ms"
        );
    }

    #[tokio::test]
    async fn test_disabled_pacer_never_waits() {
        let pacer = RequestPacer::disabled();
        assert!(!pacer.is_enabled());

        let start = StdInstant::now();
        for _ in 0..50 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
