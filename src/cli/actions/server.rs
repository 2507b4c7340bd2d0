use crate::allowlist::PgAllowlist;
use crate::auth::cache::ValidationCache;
use crate::auth::domain::DomainResolver;
use crate::auth::orchestrator::Gateway;
use crate::auth::pipeline::CredentialValidator;
use crate::auth::rate_limit::RateLimiter;
use crate::auth::AuthConfig;
use crate::directory::graph::GraphDirectory;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub secret: SecretString,
    pub dsn: String,
    pub gateway_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth: AuthConfig,
}

/// Assemble the collaborators and run the RADIUS server until interrupted.
///
/// # Errors
///
/// Returns an error if the DSN is malformed, the database pool cannot be
/// created, or the listener fails to bind.
pub async fn handle(args: Args) -> Result<()> {
    let dsn = Url::parse(&args.dsn).context("parsing --dsn")?;
    if !matches!(dsn.scheme(), "postgres" | "postgresql") {
        return Err(anyhow!("unsupported DSN scheme: {}", dsn.scheme()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(dsn.as_str())
        .await
        .context("connecting to the allowlist database")?;

    info!(gateway_id = %args.gateway_id, "connected to the allowlist database");

    let allowlist = Arc::new(PgAllowlist::new(pool, args.gateway_id));
    let directory = Arc::new(GraphDirectory::new(
        args.tenant_id,
        args.client_id,
        args.client_secret,
    )?);

    let cache = Arc::new(ValidationCache::new(args.auth.cache_ttl()));
    let limiter = Arc::new(RateLimiter::new(
        args.auth.rate_limit_window(),
        args.auth.rate_limit_threshold(),
    ));

    let sweeper = cache.spawn_sweeper(args.auth.cache_sweep_interval());
    let pruner = limiter.spawn_pruner(args.auth.cache_sweep_interval());

    let resolver = DomainResolver::new(args.auth.domains().to_vec())?;
    let validator =
        CredentialValidator::new(allowlist, directory, cache, args.auth.mfa_fallback());
    let gateway = Arc::new(Gateway::new(resolver, validator, Arc::clone(&limiter)));

    let result = crate::pordisto::new(args.port, args.secret, gateway).await;

    sweeper.abort();
    pruner.abort();

    result
}
