//! Short-TTL cache of successful credential validations.
//!
//! Keys are one-way digests of (identity, password); no plaintext password is
//! ever retained. Only successes are cached: caching failures would extend an
//! attacker's feedback window and could mask a just-fixed password.

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant};
use tracing::debug;

/// SHA-256 of `lowercase(identity) || 0x00 || password`.
pub type CredentialDigest = [u8; 32];

/// Digest used as the cache key, so the cache never holds the credentials
/// themselves.
#[must_use]
pub fn credential_digest(identity: &str, password: &SecretString) -> CredentialDigest {
    let mut hasher = Sha256::new();
    hasher.update(identity.to_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(password.expose_secret().as_bytes());
    hasher.finalize().into()
}

/// Concurrent digest → expiry map. Reads self-filter by expiry; the
/// background sweep only reclaims memory and is not needed for correctness.
#[derive(Debug)]
pub struct ValidationCache {
    entries: DashMap<CredentialDigest, Instant>,
    ttl: Duration,
}

impl ValidationCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// True when a live (non-expired) entry exists for the digest.
    #[must_use]
    pub fn get(&self, digest: &CredentialDigest) -> bool {
        self.entries
            .get(digest)
            .is_some_and(|expires_at| *expires_at > Instant::now())
    }

    /// Store or overwrite an entry expiring at now + TTL.
    pub fn put(&self, digest: CredentialDigest) {
        self.entries.insert(digest, Instant::now() + self.ttl);
    }

    /// Drop every expired entry.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.retain(|_, expires_at| *expires_at > now);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Spawn the periodic sweep task. The caller owns the handle and aborts
    /// it on shutdown; request-path reads never depend on the sweep.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut sweep_interval = interval(period);
            // first tick completes immediately
            sweep_interval.tick().await;
            loop {
                sweep_interval.tick().await;
                cache.sweep();
                debug!(entries = cache.len(), "validation cache swept");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn password(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn digest_is_stable_and_case_insensitive_on_identity() {
        let first = credential_digest("JDoe@corp.example", &password("hunter2"));
        let second = credential_digest("jdoe@corp.example", &password("hunter2"));
        assert_eq!(first, second);
    }

    #[test]
    fn digest_diverges_per_password_and_identity() {
        let base = credential_digest("jdoe@corp.example", &password("hunter2"));
        assert_ne!(
            base,
            credential_digest("jdoe@corp.example", &password("hunter3"))
        );
        assert_ne!(
            base,
            credential_digest("asmith@corp.example", &password("hunter2"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn live_entry_hits_within_ttl() {
        let cache = ValidationCache::new(Duration::from_secs(120));
        let digest = credential_digest("jdoe@corp.example", &password("hunter2"));

        assert!(!cache.get(&digest));
        cache.put(digest);
        advance(Duration::from_secs(119)).await;
        assert!(cache.get(&digest));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_absent_even_before_sweep() {
        let cache = ValidationCache::new(Duration::from_secs(120));
        let digest = credential_digest("jdoe@corp.example", &password("hunter2"));

        cache.put(digest);
        advance(Duration::from_secs(121)).await;
        assert!(!cache.get(&digest));
        // not yet swept, memory still held
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_reclaims_only_expired_entries() {
        let cache = ValidationCache::new(Duration::from_secs(120));
        let old = credential_digest("old@corp.example", &password("hunter2"));
        let fresh = credential_digest("fresh@corp.example", &password("hunter2"));

        cache.put(old);
        advance(Duration::from_secs(100)).await;
        cache.put(fresh);
        advance(Duration::from_secs(30)).await;

        cache.sweep();
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn background_sweeper_runs_on_its_period() {
        let cache = Arc::new(ValidationCache::new(Duration::from_secs(1)));
        let digest = credential_digest("jdoe@corp.example", &password("hunter2"));
        cache.put(digest);

        let sweeper = cache.spawn_sweeper(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(cache.is_empty());
        sweeper.abort();
    }
}
