//! Trailing debounce and minimum-interval gate
//!
//! Two independent throttles that the cart manager and the sync adapter
//! combine:
//!
//! - [`Debouncer::settle`]: trailing debounce. Every call waits `delay`; only
//!   the last call of a burst comes back `true`.
//! - [`Debouncer::try_fire`]: minimum interval. Opens at most once per
//!   `min_interval`.
//!
//! Both are best-effort throttles, not locks.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Trailing delay applied by `settle`
    pub delay: Duration,
    /// Minimum spacing enforced by `try_fire`
    pub min_interval: Duration,
}

impl DebounceConfig {
    pub fn new(delay: Duration, min_interval: Duration) -> Self {
        Self {
            delay,
            min_interval,
        }
    }

    /// Trailing debounce only, no interval gate
    pub fn trailing(delay: Duration) -> Self {
        Self::new(delay, Duration::ZERO)
    }
}

#[derive(Debug)]
pub struct Debouncer {
    config: DebounceConfig,
    generation: AtomicU64,
    last_fired: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
            last_fired: Mutex::new(None),
        }
    }

    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Waits out the trailing delay. Returns `false` when a later call
    /// arrived in the meantime and superseded this one.
    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Time left before the interval gate opens again
    pub fn remaining(&self) -> Duration {
        let last = *self.last_fired.lock().unwrap_or_else(PoisonError::into_inner);
        match last {
            None => Duration::ZERO,
            Some(at) => self.config.min_interval.saturating_sub(at.elapsed()),
        }
    }

    /// Opens the gate if `min_interval` has passed since the last fire, and
    /// records this fire.
    pub fn try_fire(&self) -> bool {
        let mut last = self.last_fired.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let open = match *last {
            None => true,
            Some(at) => now.duration_since(at) >= self.config.min_interval,
        };
        if open {
            *last = Some(now);
        }
        open
    }

    /// Records a fire that bypassed the gate
    pub fn mark_fired(&self) {
        *self.last_fired.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Forgets the last fire; the next `try_fire` opens immediately
    pub fn reset(&self) {
        *self.last_fired.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_settle_keeps_only_last_call_of_burst() {
        let debouncer = Arc::new(Debouncer::new(DebounceConfig::trailing(
            Duration::from_millis(100),
        )));

        let mut handles = Vec::new();
        for i in 0..3u64 {
            let d = debouncer.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10 * i)).await;
                d.settle().await
            }));
        }
        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }
        assert_eq!(results, vec![false, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_separate_bursts_both_fire() {
        let debouncer = Debouncer::new(DebounceConfig::trailing(Duration::from_millis(50)));
        assert!(debouncer.settle().await);
        assert!(debouncer.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_interval_gate() {
        let debouncer = Debouncer::new(DebounceConfig::new(Duration::ZERO, Duration::from_secs(1)));
        assert!(debouncer.try_fire());
        assert!(!debouncer.try_fire());
        assert!(debouncer.remaining() > Duration::ZERO);

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!debouncer.try_fire());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(debouncer.remaining(), Duration::ZERO);
        assert!(debouncer.try_fire());

        debouncer.reset();
        assert!(debouncer.try_fire());
    }
}
