//! Directory-of-record boundary.
//!
//! The core needs exactly two logical operations from the directory: "does
//! this user exist and is the account enabled" and "do these credentials
//! authenticate". Everything else about the directory's API stays behind
//! this module.

pub mod graph;

use async_trait::async_trait;
use secrecy::SecretString;

/// Existence/enabled answer for a candidate identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryUser {
    /// The directory's canonical form of the identity.
    pub canonical_identity: String,
    pub enabled: bool,
}

/// Machine-readable classification of a password-validation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordOutcome {
    Valid,
    /// The directory did not reject the password outright but demands an
    /// interactive multi-factor completion.
    MfaRequired,
    InvalidCredentials,
    AccountDisabled,
    PasswordExpired,
    AccountLocked,
}

/// Transport or protocol failure talking to the directory; callers map this
/// to a transient `ValidationServiceError` verdict.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected directory response: {status} {detail}")]
    UnexpectedResponse { status: u16, detail: String },

    #[error("invalid directory response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Look up a candidate identity. `Ok(None)` means the user does not
    /// exist; a disabled account is reported through [`DirectoryUser`].
    async fn find_user(&self, identity: &str) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Validate the identity's password and classify the directory's answer.
    async fn validate_password(
        &self,
        identity: &str,
        password: &SecretString,
    ) -> Result<PasswordOutcome, DirectoryError>;
}
