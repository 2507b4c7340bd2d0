//! Terminal outcome of one authentication attempt.
//!
//! Reason codes are internal only: the wire response collapses to
//! accept/reject and must look identical regardless of why a request failed.

/// Machine-readable reason behind a verdict, for logs and traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReasonCode {
    DomainNotAllowed,
    RateLimited,
    UserNotAllowed,
    UserNotFound,
    AccountDisabled,
    InvalidCredentials,
    PasswordExpired,
    AccountLocked,
    Validated,
    CachedSuccess,
    /// Accepted without full password proof: the directory demanded an MFA
    /// challenge this gateway cannot complete.
    LimitedValidationMfa,
    ValidationServiceError,
    NoDomainMatched,
}

impl ReasonCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomainNotAllowed => "domain_not_allowed",
            Self::RateLimited => "rate_limited",
            Self::UserNotAllowed => "user_not_allowed",
            Self::UserNotFound => "user_not_found",
            Self::AccountDisabled => "account_disabled",
            Self::InvalidCredentials => "invalid_credentials",
            Self::PasswordExpired => "password_expired",
            Self::AccountLocked => "account_locked",
            Self::Validated => "validated",
            Self::CachedSuccess => "cached_success",
            Self::LimitedValidationMfa => "limited_validation_mfa",
            Self::ValidationServiceError => "validation_service_error",
            Self::NoDomainMatched => "no_domain_matched",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub reason: ReasonCode,
    pub matched_domain: Option<String>,
}

impl Verdict {
    /// Accepting verdict for a fully-qualified identity.
    #[must_use]
    pub fn accept(reason: ReasonCode, identity: &str) -> Self {
        Self {
            success: true,
            reason,
            matched_domain: identity
                .rsplit_once('@')
                .map(|(_, domain)| domain.to_string()),
        }
    }

    #[must_use]
    pub const fn reject(reason: ReasonCode) -> Self {
        Self {
            success: false,
            reason,
            matched_domain: None,
        }
    }
}
