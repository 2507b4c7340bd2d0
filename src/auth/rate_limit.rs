//! Sliding-window brute-force limiter keyed by canonical identity.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::debug;

/// Per-key log of failed-attempt instants. Only instants inside the trailing
/// window count toward the threshold; older ones are inert and pruned lazily.
#[derive(Debug)]
pub struct RateLimiter {
    attempts: DashMap<String, Vec<Instant>>,
    window: Duration,
    threshold: usize,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            attempts: DashMap::new(),
            window,
            threshold,
        }
    }

    /// True when the key accumulated at least `threshold` failures within the
    /// trailing window.
    #[must_use]
    pub fn is_blocked(&self, key: &str) -> bool {
        let cutoff = Instant::now().checked_sub(self.window);
        self.attempts.get(key).is_some_and(|log| {
            log.iter()
                .filter(|stamp| cutoff.map_or(true, |cutoff| **stamp > cutoff))
                .count()
                >= self.threshold
        })
    }

    /// Append a failure instant for the key, pruning aged-out instants for
    /// that key while the entry is held.
    pub fn record_failure(&self, key: &str) {
        let now = Instant::now();
        let cutoff = now.checked_sub(self.window);
        let mut log = self.attempts.entry(key.to_string()).or_default();
        if let Some(cutoff) = cutoff {
            log.retain(|stamp| *stamp > cutoff);
        }
        log.push(now);
    }

    /// Drop the key's failure history entirely (called on success).
    pub fn clear(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Drop keys whose failures have all aged out of the window, bounding
    /// memory for identities that never authenticate again.
    pub fn prune(&self) {
        let Some(cutoff) = Instant::now().checked_sub(self.window) else {
            return;
        };
        self.attempts.retain(|_, log| {
            log.retain(|stamp| *stamp > cutoff);
            !log.is_empty()
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Spawn the periodic prune task; the caller aborts the handle on
    /// shutdown.
    pub fn spawn_pruner(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut prune_interval = interval(period);
            prune_interval.tick().await;
            loop {
                prune_interval.tick().await;
                limiter.prune();
                debug!(keys = limiter.len(), "rate limiter pruned");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const KEY: &str = "jdoe@corp.example";

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(300), 5)
    }

    #[tokio::test(start_paused = true)]
    async fn under_threshold_is_not_blocked() {
        let limiter = limiter();
        for _ in 0..4 {
            limiter.record_failure(KEY);
        }
        assert!(!limiter.is_blocked(KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn threshold_failures_within_window_block() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.record_failure(KEY);
            advance(Duration::from_secs(10)).await;
        }
        assert!(limiter.is_blocked(KEY));
        assert!(!limiter.is_blocked("other@corp.example"));
    }

    #[tokio::test(start_paused = true)]
    async fn block_lifts_once_window_elapses() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.record_failure(KEY);
        }
        assert!(limiter.is_blocked(KEY));

        advance(Duration::from_secs(301)).await;
        assert!(!limiter.is_blocked(KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_then_single_failure_stays_unblocked() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.record_failure(KEY);
        }
        limiter.clear(KEY);
        limiter.record_failure(KEY);
        assert!(!limiter.is_blocked(KEY));
    }

    #[tokio::test(start_paused = true)]
    async fn prune_drops_keys_with_no_in_window_failures() {
        let limiter = limiter();
        limiter.record_failure("stale@corp.example");
        advance(Duration::from_secs(200)).await;
        limiter.record_failure("active@corp.example");
        advance(Duration::from_secs(150)).await;

        limiter.prune();
        assert_eq!(limiter.len(), 1);
        assert!(!limiter.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn record_failure_prunes_the_touched_key() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.record_failure(KEY);
        }
        advance(Duration::from_secs(301)).await;

        // the five old stamps are out of window; this one starts fresh
        limiter.record_failure(KEY);
        assert!(!limiter.is_blocked(KEY));
    }
}
