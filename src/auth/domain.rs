//! Multi-domain username resolution.

use anyhow::{anyhow, Result};

/// The explicit domain suffix is not in the configured allowed-domain list.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("domain not allowed: {domain}")]
pub struct DomainNotAllowed {
    pub domain: String,
}

/// Expands a raw username into the ordered list of fully-qualified
/// candidate identities to attempt.
#[derive(Clone, Debug)]
pub struct DomainResolver {
    domains: Vec<String>,
}

impl DomainResolver {
    /// # Errors
    ///
    /// Returns an error when no domains are configured; this is a startup
    /// failure, not a per-request condition.
    pub fn new(domains: Vec<String>) -> Result<Self> {
        if domains.is_empty() {
            return Err(anyhow!("at least one allowed domain must be configured"));
        }
        Ok(Self { domains })
    }

    /// Resolve a raw username into candidate identities.
    ///
    /// A username carrying an explicit domain is kept as-is when that domain
    /// is allowed (matched case-insensitively); a bare username fans out to
    /// one candidate per configured domain, in configured order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainNotAllowed`] for an explicit domain outside the
    /// configured list; no directory calls are made in that case.
    pub fn resolve(&self, raw_username: &str) -> Result<Vec<String>, DomainNotAllowed> {
        match raw_username.rsplit_once('@') {
            Some((_, domain)) => {
                if self
                    .domains
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(domain))
                {
                    Ok(vec![raw_username.to_string()])
                } else {
                    Err(DomainNotAllowed {
                        domain: domain.to_string(),
                    })
                }
            }
            None => Ok(self
                .domains
                .iter()
                .map(|domain| format!("{raw_username}@{domain}"))
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DomainResolver {
        DomainResolver::new(vec![
            "corp.example".to_string(),
            "legacy.example".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn empty_domain_list_is_a_startup_error() {
        assert!(DomainResolver::new(vec![]).is_err());
    }

    #[test]
    fn explicit_allowed_domain_is_sole_candidate() {
        let candidates = resolver().resolve("jdoe@corp.example").unwrap();
        assert_eq!(candidates, ["jdoe@corp.example"]);
    }

    #[test]
    fn explicit_domain_matches_case_insensitively() {
        let candidates = resolver().resolve("jdoe@CORP.Example").unwrap();
        assert_eq!(candidates, ["jdoe@CORP.Example"]);
    }

    #[test]
    fn explicit_foreign_domain_is_rejected() {
        let err = resolver().resolve("jdoe@evil.example").unwrap_err();
        assert_eq!(err.domain, "evil.example");
    }

    #[test]
    fn bare_username_fans_out_in_configured_order() {
        let candidates = resolver().resolve("jdoe").unwrap();
        assert_eq!(candidates, ["jdoe@corp.example", "jdoe@legacy.example"]);
    }

    #[test]
    fn multiple_at_signs_resolve_against_last_segment() {
        // "a@b@corp.example" is treated as local part "a@b"; the suffix is
        // what gets matched against the allowed list.
        let candidates = resolver().resolve("a@b@corp.example").unwrap();
        assert_eq!(candidates, ["a@b@corp.example"]);

        assert!(resolver().resolve("a@corp.example@evil.example").is_err());
    }
}
