//! # Pordisto (RADIUS credential-validation gateway)
//!
//! `pordisto` sits between a RADIUS client population and an external
//! directory of record (Microsoft Entra ID). It decides whether a presented
//! identity is permitted on this gateway instance and whether its credentials
//! are valid, and answers with a bare Access-Accept or Access-Reject.
//!
//! ## Authentication pipeline
//!
//! For each request: resolve the raw username into fully-qualified candidate
//! identities (configured-domain order), then per candidate run
//! allowlist → validation cache → existence/enabled → password validation.
//! The whole multi-domain attempt is wrapped in a per-identity rate limiter.
//!
//! ## MFA fallback
//!
//! RADIUS cannot complete an interactive MFA challenge. When the directory
//! answers a password grant with an MFA challenge, the gateway (if configured
//! to) accepts the request with a `LimitedValidationMfa` reason and a distinct
//! warning event. This is a deliberate trust degradation: the password itself
//! was not rejected, but it was not fully proven either. Disable with
//! `--mfa-fallback=false` if the directory tenant can exempt the gateway
//! instead.
//!
//! ## Wire behavior
//!
//! Rejections are indistinguishable on the wire regardless of cause; the
//! richer reason codes exist only in logs and traces.

pub mod allowlist;
pub mod auth;
pub mod cli;
pub mod directory;
pub mod pordisto;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
