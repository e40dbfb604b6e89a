use chrono::{DateTime, TimeDelta, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tessera_core::{
    IdentityId, SingleUseToken, TokenKind, TokenLedger, TokenLedgerError, TokenValue,
};
use uuid::Uuid;

/// Token ledger on PostgreSQL. `consume` is a single guarded `UPDATE ...
/// RETURNING`, so the row lock decides the one winner among concurrent calls.
pub struct PostgresTokenLedger {
    pool: PgPool,
}

impl PostgresTokenLedger {
    pub fn new(pool: PgPool) -> Self {
        PostgresTokenLedger { pool }
    }

    /// Delete tokens that are consumed or past expiry. Returns how many were removed.
    #[tracing::instrument(name = "Purging unusable tokens", skip_all)]
    pub async fn purge_unusable(&self) -> Result<u64, TokenLedgerError> {
        let result = sqlx::query(
            "DELETE FROM single_use_tokens WHERE consumed_at IS NOT NULL OR expires_at <= now()",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| TokenLedgerError::UnexpectedError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: Uuid,
    owner_id: Uuid,
    kind: String,
    value: String,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for SingleUseToken {
    type Error = TokenLedgerError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(SingleUseToken {
            id: row.id,
            owner_id: IdentityId::from(row.owner_id),
            kind: row
                .kind
                .parse()
                .map_err(|e: tessera_core::UnknownTokenKind| {
                    TokenLedgerError::UnexpectedError(e.to_string())
                })?,
            value: TokenValue::new(row.value),
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait::async_trait]
impl TokenLedger for PostgresTokenLedger {
    #[tracing::instrument(name = "Creating single-use token", skip(self))]
    async fn create(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> Result<TokenValue, TokenLedgerError> {
        let token = SingleUseToken::issue(owner_id, kind, ttl, Utc::now());

        sqlx::query(
            r#"
                INSERT INTO single_use_tokens (id, owner_id, kind, value, expires_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(Uuid::from(token.owner_id))
        .bind(token.kind.as_str())
        .bind(token.value.expose_secret())
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenLedgerError::UnexpectedError(e.to_string()))?;

        Ok(token.value)
    }

    #[tracing::instrument(name = "Consuming single-use token", skip_all)]
    async fn consume(&self, value: &TokenValue) -> Result<SingleUseToken, TokenLedgerError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
                UPDATE single_use_tokens
                SET consumed_at = now()
                WHERE value = $1 AND consumed_at IS NULL AND expires_at > now()
                RETURNING id, owner_id, kind, value, expires_at, consumed_at, created_at
            "#,
        )
        .bind(value.expose_secret())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TokenLedgerError::UnexpectedError(e.to_string()))?;

        let Some(row) = row else {
            return Err(TokenLedgerError::NotFound);
        };

        row.try_into()
    }

    #[tracing::instrument(name = "Deleting superseded tokens", skip(self))]
    async fn delete_by_owner_and_type(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
    ) -> Result<u64, TokenLedgerError> {
        let result = sqlx::query("DELETE FROM single_use_tokens WHERE owner_id = $1 AND kind = $2")
            .bind(Uuid::from(owner_id))
            .bind(kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| TokenLedgerError::UnexpectedError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
