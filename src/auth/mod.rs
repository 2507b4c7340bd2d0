//! Authentication orchestration: domain resolution, the
//! allowlist/cache/directory pipeline, and rate-limit bookkeeping.

pub mod cache;
pub mod domain;
pub mod orchestrator;
pub mod pipeline;
pub mod rate_limit;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(120);
const DEFAULT_CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(300);
const DEFAULT_RATE_LIMIT_THRESHOLD: usize = 5;

/// Immutable gateway configuration, injected into each component at
/// construction.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    domains: Vec<String>,
    cache_ttl: Duration,
    cache_sweep_interval: Duration,
    rate_limit_window: Duration,
    rate_limit_threshold: usize,
    mfa_fallback: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(domains: Vec<String>) -> Self {
        Self {
            domains,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_sweep_interval: DEFAULT_CACHE_SWEEP_INTERVAL,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            rate_limit_threshold: DEFAULT_RATE_LIMIT_THRESHOLD,
            mfa_fallback: true,
        }
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_cache_sweep_interval(mut self, interval: Duration) -> Self {
        self.cache_sweep_interval = interval;
        self
    }

    #[must_use]
    pub fn with_rate_limit_window(mut self, window: Duration) -> Self {
        self.rate_limit_window = window;
        self
    }

    #[must_use]
    pub fn with_rate_limit_threshold(mut self, threshold: usize) -> Self {
        self.rate_limit_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_mfa_fallback(mut self, enabled: bool) -> Self {
        self.mfa_fallback = enabled;
        self
    }

    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    #[must_use]
    pub fn cache_sweep_interval(&self) -> Duration {
        self.cache_sweep_interval
    }

    #[must_use]
    pub fn rate_limit_window(&self) -> Duration {
        self.rate_limit_window
    }

    #[must_use]
    pub fn rate_limit_threshold(&self) -> usize {
        self.rate_limit_threshold
    }

    #[must_use]
    pub fn mfa_fallback(&self) -> bool {
        self.mfa_fallback
    }
}
