use async_trait::async_trait;
use chrono::TimeDelta;
use thiserror::Error;

use crate::domain::{
    email::Email,
    identity::Identity,
    ids::{IdentityId, TenantId},
    tenant::Tenant,
    token::{SingleUseToken, TokenKind, TokenValue},
};

// IdentityStore port trait and errors
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    #[error("An identity with this email already exists in the tenant")]
    DuplicateIdentity,
    #[error("Identity not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for IdentityStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::DuplicateIdentity, Self::DuplicateIdentity)
                | (Self::NotFound, Self::NotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Identity persistence. Implementations must reject a second identity with
/// the same `(tenant_id, lower(email))`, on insert and on update, with
/// `DuplicateIdentity`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn insert(&self, identity: Identity) -> Result<(), IdentityStoreError>;
    async fn get_by_id(&self, id: IdentityId) -> Result<Identity, IdentityStoreError>;
    async fn get_by_email_in_tenant(
        &self,
        tenant_id: TenantId,
        email: &Email,
    ) -> Result<Identity, IdentityStoreError>;
    /// Overwrites every mutable field of the stored record with the same id.
    async fn update(&self, identity: &Identity) -> Result<(), IdentityStoreError>;
}

// TenantStore port trait and errors
#[derive(Debug, Error)]
pub enum TenantStoreError {
    #[error("Subdomain already taken")]
    DuplicateSubdomain,
    #[error("Tenant not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for TenantStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::DuplicateSubdomain, Self::DuplicateSubdomain)
                | (Self::NotFound, Self::NotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn insert(&self, tenant: Tenant) -> Result<(), TenantStoreError>;
    async fn get_by_id(&self, id: TenantId) -> Result<Tenant, TenantStoreError>;
}

// TokenLedger port trait and errors
#[derive(Debug, Error)]
pub enum TokenLedgerError {
    /// Unknown, expired, or already consumed. Deliberately indistinguishable.
    #[error("Token not found")]
    NotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for TokenLedgerError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::NotFound, Self::NotFound) | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Durable store of single-use tokens.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Generate and persist a fresh unconsumed token, returning its raw value.
    async fn create(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> Result<TokenValue, TokenLedgerError>;

    /// Atomically find a usable token with this value, mark it consumed and
    /// return it. Of any number of concurrent calls with one value, at most
    /// one succeeds; the rest get `NotFound`.
    async fn consume(&self, value: &TokenValue) -> Result<SingleUseToken, TokenLedgerError>;

    /// Remove every token of `kind` owned by `owner_id`. Returns how many were removed.
    async fn delete_by_owner_and_type(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
    ) -> Result<u64, TokenLedgerError>;
}
