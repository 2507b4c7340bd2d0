//! Mock collaborators with call counters for pipeline and orchestrator tests.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::allowlist::{AllowlistError, AllowlistGateway};
use crate::directory::{DirectoryError, DirectoryGateway, DirectoryUser, PasswordOutcome};

pub(crate) fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[derive(Default)]
pub(crate) struct MockAllowlist {
    allowed: Vec<String>,
    fail: bool,
    pub(crate) calls: AtomicUsize,
}

impl MockAllowlist {
    pub(crate) fn allowing(identities: &[&str]) -> Self {
        Self {
            allowed: identities.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AllowlistGateway for MockAllowlist {
    async fn is_allowed(&self, identity: &str) -> Result<bool, AllowlistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AllowlistError::Query(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .allowed
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(identity)))
    }
}

#[derive(Default)]
pub(crate) struct MockDirectory {
    users: HashMap<String, DirectoryUser>,
    outcomes: HashMap<String, PasswordOutcome>,
    fail_validate: bool,
    pub(crate) find_calls: AtomicUsize,
    pub(crate) validate_calls: AtomicUsize,
}

impl MockDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(mut self, identity: &str, enabled: bool) -> Self {
        self.users.insert(
            identity.to_string(),
            DirectoryUser {
                canonical_identity: identity.to_string(),
                enabled,
            },
        );
        self
    }

    pub(crate) fn with_outcome(mut self, identity: &str, outcome: PasswordOutcome) -> Self {
        self.outcomes.insert(identity.to_string(), outcome);
        self
    }

    pub(crate) fn failing_validation(mut self) -> Self {
        self.fail_validate = true;
        self
    }
}

#[async_trait]
impl DirectoryGateway for MockDirectory {
    async fn find_user(&self, identity: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.get(identity).cloned())
    }

    async fn validate_password(
        &self,
        identity: &str,
        _password: &SecretString,
    ) -> Result<PasswordOutcome, DirectoryError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_validate {
            return Err(DirectoryError::UnexpectedResponse {
                status: 503,
                detail: "mock outage".to_string(),
            });
        }
        Ok(self
            .outcomes
            .get(identity)
            .copied()
            .unwrap_or(PasswordOutcome::InvalidCredentials))
    }
}
