//! Microsoft Graph / Entra ID directory gateway.
//!
//! Existence checks ride an app-only (client credentials) Graph token; the
//! password check itself uses the resource-owner password grant against the
//! tenant token endpoint and classifies the AADSTS error codes it gets back.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};
use url::Url;

use super::{DirectoryError, DirectoryGateway, DirectoryUser, PasswordOutcome};
use crate::APP_USER_AGENT;

const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";
const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

// Refresh the app token slightly before the directory would expire it.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

// AADSTS error codes, per the Entra ID authentication error reference.
const AADSTS_MFA_REQUIRED: &[u64] = &[50076, 50079, 50158];
const AADSTS_INVALID_CREDENTIALS: &[u64] = &[50126, 50034];
const AADSTS_ACCOUNT_DISABLED: u64 = 50057;
const AADSTS_PASSWORD_EXPIRED: u64 = 50055;
const AADSTS_ACCOUNT_LOCKED: u64 = 50053;

struct CachedToken {
    token: SecretString,
    expires_at: Instant,
}

pub struct GraphDirectory {
    http: Client,
    tenant_id: String,
    client_id: String,
    client_secret: SecretString,
    login_base_url: String,
    graph_base_url: String,
    app_token: Mutex<Option<CachedToken>>,
}

impl GraphDirectory {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        tenant_id: String,
        client_id: String,
        client_secret: SecretString,
    ) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            tenant_id,
            client_id,
            client_secret,
            login_base_url: DEFAULT_LOGIN_BASE_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            app_token: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_login_base_url(mut self, url: &str) -> Self {
        self.login_base_url = url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_graph_base_url(mut self, url: &str) -> Self {
        self.graph_base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_base_url, self.tenant_id)
    }

    fn user_url(&self, identity: &str) -> Result<String, DirectoryError> {
        let mut url = Url::parse(&format!("{}/v1.0/users/", self.graph_base_url))
            .map_err(|err| DirectoryError::Decode(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| DirectoryError::Decode("graph base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(identity);
        url.set_query(Some("$select=userPrincipalName,accountEnabled,id"));
        Ok(url.to_string())
    }

    /// App-only Graph token, cached until shortly before expiry.
    async fn app_token(&self) -> Result<SecretString, DirectoryError> {
        let mut cached = self.app_token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", GRAPH_SCOPE),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(self.token_url())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = error_detail(&response.json().await?);
            return Err(DirectoryError::UnexpectedResponse { status, detail });
        }

        let json: Value = response.json().await?;
        let token = json["access_token"]
            .as_str()
            .ok_or_else(|| DirectoryError::Decode("no access_token in token response".to_string()))?
            .to_string();
        let expires_in = json["expires_in"].as_u64().unwrap_or(300);

        let expires_at = Instant::now() + Duration::from_secs(expires_in)
            - TOKEN_EXPIRY_MARGIN.min(Duration::from_secs(expires_in));
        debug!(expires_in, "acquired app token");

        let token = SecretString::from(token);
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });

        Ok(token)
    }
}

#[async_trait]
impl DirectoryGateway for GraphDirectory {
    #[instrument(skip(self))]
    async fn find_user(&self, identity: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        let token = self.app_token().await?;

        let response = self
            .http
            .get(self.user_url(identity)?)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = error_detail(&response.json().await?);
            return Err(DirectoryError::UnexpectedResponse { status, detail });
        }

        let json: Value = response.json().await?;
        let canonical_identity = json["userPrincipalName"]
            .as_str()
            .ok_or_else(|| {
                DirectoryError::Decode("no userPrincipalName in user response".to_string())
            })?
            .to_string();
        let enabled = json["accountEnabled"].as_bool().unwrap_or(false);

        Ok(Some(DirectoryUser {
            canonical_identity,
            enabled,
        }))
    }

    #[instrument(skip(self, password))]
    async fn validate_password(
        &self,
        identity: &str,
        password: &SecretString,
    ) -> Result<PasswordOutcome, DirectoryError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("scope", GRAPH_SCOPE),
            ("grant_type", "password"),
            ("username", identity),
            ("password", password.expose_secret()),
        ];

        let response = self
            .http
            .post(self.token_url())
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(PasswordOutcome::Valid);
        }

        let status = response.status().as_u16();
        let json: Value = response.json().await?;
        let codes: Vec<u64> = json["error_codes"]
            .as_array()
            .map(|codes| codes.iter().filter_map(Value::as_u64).collect())
            .unwrap_or_default();

        classify_error_codes(&codes).ok_or_else(|| DirectoryError::UnexpectedResponse {
            status,
            detail: error_detail(&json),
        })
    }
}

/// Map AADSTS error codes from a failed password grant to an outcome; `None`
/// means the failure is unclassified (treated as transient upstream).
fn classify_error_codes(codes: &[u64]) -> Option<PasswordOutcome> {
    if codes.iter().any(|code| AADSTS_MFA_REQUIRED.contains(code)) {
        return Some(PasswordOutcome::MfaRequired);
    }
    if codes.iter().any(|code| code == &AADSTS_ACCOUNT_LOCKED) {
        return Some(PasswordOutcome::AccountLocked);
    }
    if codes.iter().any(|code| code == &AADSTS_PASSWORD_EXPIRED) {
        return Some(PasswordOutcome::PasswordExpired);
    }
    if codes.iter().any(|code| code == &AADSTS_ACCOUNT_DISABLED) {
        return Some(PasswordOutcome::AccountDisabled);
    }
    if codes
        .iter()
        .any(|code| AADSTS_INVALID_CREDENTIALS.contains(code))
    {
        return Some(PasswordOutcome::InvalidCredentials);
    }
    None
}

fn error_detail(json: &Value) -> String {
    json["error_description"]
        .as_str()
        .or_else(|| json["error"]["message"].as_str())
        .or_else(|| json["error"].as_str())
        .unwrap_or("")
        .chars()
        .take(200)
        .collect()
}
