use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tessera_core::{Tenant, TenantId, TenantStore, TenantStoreError};
use uuid::Uuid;

use super::postgres::is_unique_violation;

pub struct PostgresTenantStore {
    pool: PgPool,
}

impl PostgresTenantStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresTenantStore { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    subdomain: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = TenantStoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(Tenant {
            id: TenantId::from(row.id),
            name: row.name,
            subdomain: row.subdomain,
            status: row
                .status
                .parse()
                .map_err(|e: tessera_core::UnknownTenantStatus| {
                    TenantStoreError::UnexpectedError(e.to_string())
                })?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait::async_trait]
impl TenantStore for PostgresTenantStore {
    #[tracing::instrument(name = "Adding tenant to PostgreSQL", skip_all)]
    async fn insert(&self, tenant: Tenant) -> Result<(), TenantStoreError> {
        sqlx::query(
            r#"
                INSERT INTO tenants (id, name, subdomain, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(tenant.id))
        .bind(&tenant.name)
        .bind(&tenant.subdomain)
        .bind(tenant.status.as_str())
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return TenantStoreError::DuplicateSubdomain;
            }
            TenantStoreError::UnexpectedError(e.to_string())
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving tenant from PostgreSQL", skip_all)]
    async fn get_by_id(&self, id: TenantId) -> Result<Tenant, TenantStoreError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
                SELECT id, name, subdomain, status, created_at, updated_at
                FROM tenants
                WHERE id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TenantStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(TenantStoreError::NotFound);
        };

        row.try_into()
    }
}
