use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Global minimum spacing between accepted insight requests.
///
/// A rejected request does not move the window; only accepted ones do.
#[derive(Debug)]
pub struct InsightThrottle {
    interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl InsightThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: Mutex::new(None),
        }
    }

    /// Returns `true` and records the call if the interval has elapsed since the last accepted one.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut last = self
            .last_accepted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match *last {
            Some(previous) if now.duration_since(previous) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
