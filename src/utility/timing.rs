// ============================================
// TIMING UTILITY - request latency logging
// ============================================
// Usage:
//   let timer = Timer::start_with_threshold("option_chain", 2_000);
//   ... work ...
//   timer.stop();
//
//   let out = timed_async_if_slow("candles", 2_000, || fetch()).await;
// ============================================

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timer for measuring execution time
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: u128,
    stopped: bool,
}

impl Timer {
    /// Create a timer that warns if execution exceeds threshold (in milliseconds)
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms,
            stopped: false,
        }
    }

    /// Stop the timer and log the result
    pub fn stop(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.log_duration(duration);
        self.stopped = true;
        duration
    }

    fn log_duration(&self, duration: Duration) {
        let ms = duration.as_millis();
        if ms >= self.threshold_ms {
            warn!(operation = %self.name, elapsed_ms = ms as u64, "Slow operation");
        } else {
            debug!(operation = %self.name, elapsed_ms = ms as u64, "Operation finished");
        }
    }
}

// Log on drop too, so early returns through `?` still get timed
impl Drop for Timer {
    fn drop(&mut self) {
        if !self.stopped {
            self.log_duration(self.start.elapsed());
        }
    }
}

/// Time an async function, warning when it runs past `threshold_ms`
pub async fn timed_async_if_slow<F, Fut, R>(name: impl Into<String>, threshold_ms: u128, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let timer = Timer::start_with_threshold(name, threshold_ms);
    let result = f().await;
    timer.stop();
    result
}
