//! Per-candidate validation pipeline:
//! allowlist → cache → existence/enabled → password validation.

use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::cache::{credential_digest, ValidationCache};
use super::verdict::{ReasonCode, Verdict};
use crate::allowlist::AllowlistGateway;
use crate::directory::{DirectoryGateway, PasswordOutcome};

pub struct CredentialValidator {
    allowlist: Arc<dyn AllowlistGateway>,
    directory: Arc<dyn DirectoryGateway>,
    cache: Arc<ValidationCache>,
    mfa_fallback: bool,
}

impl CredentialValidator {
    #[must_use]
    pub fn new(
        allowlist: Arc<dyn AllowlistGateway>,
        directory: Arc<dyn DirectoryGateway>,
        cache: Arc<ValidationCache>,
        mfa_fallback: bool,
    ) -> Self {
        Self {
            allowlist,
            directory,
            cache,
            mfa_fallback,
        }
    }

    /// Run the pipeline for one fully-qualified identity, short-circuiting on
    /// the first failing step. Collaborator errors never escape: they map to
    /// a `ValidationServiceError` verdict.
    pub async fn validate(&self, identity: &str, password: &SecretString) -> Verdict {
        match self.allowlist.is_allowed(identity).await {
            Ok(true) => {}
            Ok(false) => return Verdict::reject(ReasonCode::UserNotAllowed),
            Err(err) => {
                error!(identity, error = %err, "allowlist check failed");
                return Verdict::reject(ReasonCode::ValidationServiceError);
            }
        }

        let digest = credential_digest(identity, password);
        if self.cache.get(&digest) {
            debug!(identity, "validation cache hit");
            return Verdict::accept(ReasonCode::CachedSuccess, identity);
        }

        match self.directory.find_user(identity).await {
            Ok(None) => return Verdict::reject(ReasonCode::UserNotFound),
            Ok(Some(user)) if !user.enabled => {
                return Verdict::reject(ReasonCode::AccountDisabled)
            }
            Ok(Some(_)) => {}
            Err(err) => {
                error!(identity, error = %err, "directory lookup failed");
                return Verdict::reject(ReasonCode::ValidationServiceError);
            }
        }

        match self.directory.validate_password(identity, password).await {
            Ok(PasswordOutcome::Valid) => {
                self.cache.put(digest);
                Verdict::accept(ReasonCode::Validated, identity)
            }
            Ok(PasswordOutcome::MfaRequired) if self.mfa_fallback => {
                // Deliberate trust degradation: the user exists, is enabled
                // and allowlisted, and the directory did not reject the
                // password outright, but it was not fully proven either.
                warn!(
                    identity,
                    mfa_fallback = true,
                    "accepting without full password proof: directory demands an MFA challenge this gateway cannot complete"
                );
                self.cache.put(digest);
                Verdict::accept(ReasonCode::LimitedValidationMfa, identity)
            }
            Ok(PasswordOutcome::MfaRequired) => Verdict::reject(ReasonCode::InvalidCredentials),
            Ok(PasswordOutcome::InvalidCredentials) => {
                Verdict::reject(ReasonCode::InvalidCredentials)
            }
            Ok(PasswordOutcome::AccountDisabled) => Verdict::reject(ReasonCode::AccountDisabled),
            Ok(PasswordOutcome::PasswordExpired) => Verdict::reject(ReasonCode::PasswordExpired),
            Ok(PasswordOutcome::AccountLocked) => Verdict::reject(ReasonCode::AccountLocked),
            Err(err) => {
                error!(identity, error = %err, "password validation failed");
                Verdict::reject(ReasonCode::ValidationServiceError)
            }
        }
    }
}
