//! Gateway allowlist: which directory identities may use this instance.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    #[error("allowlist query failed: {0}")]
    Query(#[from] sqlx::Error),
}

#[async_trait]
pub trait AllowlistGateway: Send + Sync {
    /// Existence of a matching row is the only fact the pipeline consumes.
    async fn is_allowed(&self, identity: &str) -> Result<bool, AllowlistError>;
}

/// Postgres-backed allowlist. Rows are scoped to a gateway instance so one
/// database can serve several gateways with disjoint user populations.
#[derive(Clone, Debug)]
pub struct PgAllowlist {
    pool: PgPool,
    gateway_id: String,
}

impl PgAllowlist {
    #[must_use]
    pub fn new(pool: PgPool, gateway_id: String) -> Self {
        Self { pool, gateway_id }
    }
}

#[async_trait]
impl AllowlistGateway for PgAllowlist {
    async fn is_allowed(&self, identity: &str) -> Result<bool, AllowlistError> {
        let query = "SELECT 1 AS present FROM gateway_access WHERE lower(user_principal_name) = lower($1) AND gateway_id = $2";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT"
        );
        let row = sqlx::query(query)
            .bind(identity)
            .bind(&self.gateway_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.is_some())
    }
}
