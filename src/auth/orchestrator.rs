//! Top-level entry point: one decoded authentication request in, one verdict
//! out, with rate-limit bookkeeping around the whole multi-domain attempt.

use secrecy::SecretString;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::domain::DomainResolver;
use super::pipeline::CredentialValidator;
use super::rate_limit::RateLimiter;
use super::verdict::{ReasonCode, Verdict};

/// One decoded authentication request, constructed by the wire front end and
/// discarded after a verdict is produced.
pub struct AuthRequest {
    pub username: String,
    pub password: SecretString,
    pub client_addr: SocketAddr,
}

pub struct Gateway {
    resolver: DomainResolver,
    validator: CredentialValidator,
    limiter: Arc<RateLimiter>,
}

impl Gateway {
    #[must_use]
    pub fn new(
        resolver: DomainResolver,
        validator: CredentialValidator,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            resolver,
            validator,
            limiter,
        }
    }

    /// Authenticate one request. Never returns an error: every internal
    /// failure collapses into a reject verdict, and the caller must answer
    /// accept/reject only; reason codes stay in the logs.
    pub async fn authenticate(&self, request: &AuthRequest) -> Verdict {
        let candidates = match self.resolver.resolve(&request.username) {
            Ok(candidates) => candidates,
            Err(err) => {
                // No directory calls and no rate-limit bookkeeping for
                // identities this gateway does not even serve.
                info!(
                    username = %request.username,
                    domain = %err.domain,
                    client = %request.client_addr,
                    "rejected: domain not allowed"
                );
                return Verdict::reject(ReasonCode::DomainNotAllowed);
            }
        };

        let Some(first_candidate) = candidates.first() else {
            return Verdict::reject(ReasonCode::NoDomainMatched);
        };
        let rate_key = first_candidate.to_lowercase();

        if self.limiter.is_blocked(&rate_key) {
            warn!(key = %rate_key, client = %request.client_addr, "rejected: rate limited");
            return Verdict::reject(ReasonCode::RateLimited);
        }

        let mut last_reason = ReasonCode::NoDomainMatched;
        for identity in &candidates {
            let verdict = self.validator.validate(identity, &request.password).await;
            if verdict.success {
                self.limiter.clear(&rate_key);
                info!(
                    identity = %identity,
                    reason = verdict.reason.as_str(),
                    client = %request.client_addr,
                    "accepted"
                );
                return verdict;
            }
            debug!(
                identity = %identity,
                reason = verdict.reason.as_str(),
                "candidate rejected"
            );
            last_reason = verdict.reason;
        }

        self.limiter.record_failure(&rate_key);

        // A single candidate keeps its specific reason; a multi-domain
        // fan-out that exhausted every candidate collapses to one code.
        let reason = if candidates.len() == 1 {
            last_reason
        } else {
            ReasonCode::NoDomainMatched
        };
        info!(
            username = %request.username,
            reason = reason.as_str(),
            client = %request.client_addr,
            "rejected"
        );
        Verdict::reject(reason)
    }
}
