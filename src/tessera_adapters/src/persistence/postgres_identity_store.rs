use chrono::{DateTime, Utc};
use secrecy::Secret;
use sqlx::PgPool;
use tessera_core::{
    Email, HashedPassword, Identity, IdentityId, IdentityStore, IdentityStoreError, Role,
    TenantId,
};
use uuid::Uuid;

use super::postgres::is_unique_violation;

/// Identity persistence on PostgreSQL. Tenant-scoped email uniqueness is the
/// `identities_tenant_email_key` index on `(tenant_id, lower(email))`.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        PostgresIdentityStore { pool }
    }
}

const IDENTITY_COLUMNS: &str = "id, tenant_id, email, password_hash, role, pending_email, \
     email_verified_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    tenant_id: Uuid,
    email: String,
    password_hash: Option<String>,
    role: String,
    pending_email: Option<String>,
    email_verified_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = IdentityStoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let unexpected =
            |e: &dyn std::fmt::Display| IdentityStoreError::UnexpectedError(e.to_string());

        Ok(Identity {
            id: IdentityId::from(row.id),
            tenant_id: TenantId::from(row.tenant_id),
            email: Email::parse(&row.email).map_err(|e| unexpected(&e))?,
            password_hash: row
                .password_hash
                .map(|hash| HashedPassword::new(Secret::from(hash))),
            role: row.role.parse::<Role>().map_err(|e| unexpected(&e))?,
            pending_email: row
                .pending_email
                .as_deref()
                .map(Email::parse)
                .transpose()
                .map_err(|e| unexpected(&e))?,
            email_verified_at: row.email_verified_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn map_write_error(e: sqlx::Error) -> IdentityStoreError {
    if is_unique_violation(&e) {
        return IdentityStoreError::DuplicateIdentity;
    }
    IdentityStoreError::UnexpectedError(e.to_string())
}

#[async_trait::async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[tracing::instrument(name = "Adding identity to PostgreSQL", skip_all)]
    async fn insert(&self, identity: Identity) -> Result<(), IdentityStoreError> {
        sqlx::query(
            r#"
                INSERT INTO identities (id, tenant_id, email, password_hash, role, pending_email,
                                        email_verified_at, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::from(identity.id))
        .bind(Uuid::from(identity.tenant_id))
        .bind(identity.email.as_str())
        .bind(identity.password_hash.as_ref().map(HashedPassword::expose))
        .bind(identity.role.as_str())
        .bind(identity.pending_email.as_ref().map(Email::as_str))
        .bind(identity.email_verified_at)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[tracing::instrument(name = "Retrieving identity by id from PostgreSQL", skip_all)]
    async fn get_by_id(&self, id: IdentityId) -> Result<Identity, IdentityStoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(IdentityStoreError::NotFound);
        };

        row.try_into()
    }

    #[tracing::instrument(name = "Retrieving identity by email from PostgreSQL", skip_all)]
    async fn get_by_email_in_tenant(
        &self,
        tenant_id: TenantId,
        email: &Email,
    ) -> Result<Identity, IdentityStoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities \
             WHERE tenant_id = $1 AND lower(email) = lower($2)"
        ))
        .bind(Uuid::from(tenant_id))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityStoreError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(IdentityStoreError::NotFound);
        };

        row.try_into()
    }

    #[tracing::instrument(name = "Updating identity in PostgreSQL", skip_all)]
    async fn update(&self, identity: &Identity) -> Result<(), IdentityStoreError> {
        let result = sqlx::query(
            r#"
                UPDATE identities
                SET email = $2,
                    password_hash = $3,
                    role = $4,
                    pending_email = $5,
                    email_verified_at = $6,
                    updated_at = $7
                WHERE id = $1
            "#,
        )
        .bind(Uuid::from(identity.id))
        .bind(identity.email.as_str())
        .bind(identity.password_hash.as_ref().map(HashedPassword::expose))
        .bind(identity.role.as_str())
        .bind(identity.pending_email.as_ref().map(Email::as_str))
        .bind(identity.email_verified_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityStoreError::NotFound);
        }

        Ok(())
    }
}
