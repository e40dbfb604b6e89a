//! Hand-rolled port implementations shared by the use case tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use secrecy::{ExposeSecret, Secret};
use tessera_core::{
    CredentialHasher, CredentialHasherError, Email, HashedPassword, Identity, IdentityId,
    IdentityStore, IdentityStoreError, IssuedSession, Password, Role, SessionClaims, SessionCodec,
    SessionError, SessionToken, SingleUseToken, Tenant, TenantId, TenantStore, TenantStoreError,
    TokenKind, TokenLedger, TokenLedgerError, TokenValue,
};
use tokio::sync::RwLock;

pub const PASSWORD: &str = "correct-horse-battery";

pub fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

pub fn password(raw: &str) -> Password {
    Password::new(Secret::from(raw.to_owned()))
}

pub fn secret(raw: &str) -> Secret<String> {
    Secret::from(raw.to_owned())
}

pub fn plain_hash(raw: &str) -> HashedPassword {
    HashedPassword::new(Secret::from(format!("plain:{raw}")))
}

/// A verified identity whose password is [`PASSWORD`].
pub fn verified_identity(tenant_id: TenantId, raw_email: &str) -> Identity {
    let mut identity = Identity::new(
        tenant_id,
        email(raw_email),
        Some(plain_hash(PASSWORD)),
        Role::User,
    );
    identity.email_verified_at = Some(Utc::now());
    identity
}

#[derive(Clone, Default)]
pub struct MockIdentityStore {
    pub identities: Arc<RwLock<HashMap<IdentityId, Identity>>>,
    pub fail_updates: Arc<AtomicBool>,
}

impl MockIdentityStore {
    pub async fn with(identities: impl IntoIterator<Item = Identity>) -> Self {
        let store = Self::default();
        for identity in identities {
            store.insert(identity).await.unwrap();
        }
        store
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub async fn stored(&self, id: IdentityId) -> Identity {
        self.identities.read().await[&id].clone()
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn insert(&self, identity: Identity) -> Result<(), IdentityStoreError> {
        let mut identities = self.identities.write().await;
        if identities
            .values()
            .any(|i| i.tenant_id == identity.tenant_id && i.email == identity.email)
        {
            return Err(IdentityStoreError::DuplicateIdentity);
        }
        identities.insert(identity.id, identity);
        Ok(())
    }

    async fn get_by_id(&self, id: IdentityId) -> Result<Identity, IdentityStoreError> {
        self.identities
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(IdentityStoreError::NotFound)
    }

    async fn get_by_email_in_tenant(
        &self,
        tenant_id: TenantId,
        email: &Email,
    ) -> Result<Identity, IdentityStoreError> {
        self.identities
            .read()
            .await
            .values()
            .find(|i| i.tenant_id == tenant_id && &i.email == email)
            .cloned()
            .ok_or(IdentityStoreError::NotFound)
    }

    async fn update(&self, identity: &Identity) -> Result<(), IdentityStoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(IdentityStoreError::UnexpectedError(
                "connection reset".to_owned(),
            ));
        }
        let mut identities = self.identities.write().await;
        if identities.values().any(|i| {
            i.id != identity.id && i.tenant_id == identity.tenant_id && i.email == identity.email
        }) {
            return Err(IdentityStoreError::DuplicateIdentity);
        }
        let stored = identities
            .get_mut(&identity.id)
            .ok_or(IdentityStoreError::NotFound)?;
        *stored = identity.clone();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockTenantStore {
    pub tenants: Arc<RwLock<HashMap<TenantId, Tenant>>>,
}

impl MockTenantStore {
    pub async fn with(tenant: Tenant) -> Self {
        let store = Self::default();
        store.insert(tenant).await.unwrap();
        store
    }
}

#[async_trait]
impl TenantStore for MockTenantStore {
    async fn insert(&self, tenant: Tenant) -> Result<(), TenantStoreError> {
        self.tenants.write().await.insert(tenant.id, tenant);
        Ok(())
    }

    async fn get_by_id(&self, id: TenantId) -> Result<Tenant, TenantStoreError> {
        self.tenants
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(TenantStoreError::NotFound)
    }
}

#[derive(Clone, Default)]
pub struct MockTokenLedger {
    pub tokens: Arc<RwLock<Vec<SingleUseToken>>>,
    pub fail_deletes: Arc<AtomicBool>,
}

impl MockTokenLedger {
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub async fn outstanding(&self, owner_id: IdentityId, kind: TokenKind) -> usize {
        self.tokens
            .read()
            .await
            .iter()
            .filter(|t| t.owner_id == owner_id && t.kind == kind && !t.is_consumed())
            .count()
    }

    pub async fn latest(&self) -> Option<SingleUseToken> {
        self.tokens.read().await.last().cloned()
    }
}

#[async_trait]
impl TokenLedger for MockTokenLedger {
    async fn create(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> Result<TokenValue, TokenLedgerError> {
        let token = SingleUseToken::issue(owner_id, kind, ttl, Utc::now());
        let value = token.value.clone();
        self.tokens.write().await.push(token);
        Ok(value)
    }

    async fn consume(&self, value: &TokenValue) -> Result<SingleUseToken, TokenLedgerError> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let token = tokens
            .iter_mut()
            .find(|t| t.value.expose_secret() == value.expose_secret() && t.is_usable_at(now))
            .ok_or(TokenLedgerError::NotFound)?;
        token.consumed_at = Some(now);
        Ok(token.clone())
    }

    async fn delete_by_owner_and_type(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
    ) -> Result<u64, TokenLedgerError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(TokenLedgerError::UnexpectedError("timeout".to_owned()));
        }
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !(t.owner_id == owner_id && t.kind == kind));
        Ok((before - tokens.len()) as u64)
    }
}

/// Stores `plain:<password>`; fast and deterministic.
#[derive(Clone, Default)]
pub struct PlainHasher;

#[async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash(&self, password: Password) -> Result<HashedPassword, CredentialHasherError> {
        Ok(plain_hash(password.as_ref().expose_secret()))
    }

    async fn verify(
        &self,
        candidate: Password,
        expected: HashedPassword,
    ) -> Result<bool, CredentialHasherError> {
        Ok(plain_hash(candidate.as_ref().expose_secret()).expose() == expected.expose())
    }
}

/// Remembers issued claims by token string instead of signing them.
#[derive(Clone, Default)]
pub struct MemorySessionCodec {
    issued: Arc<std::sync::Mutex<HashMap<String, SessionClaims>>>,
}

impl SessionCodec for MemorySessionCodec {
    fn issue(&self, identity: &Identity, ttl: TimeDelta) -> Result<IssuedSession, SessionError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: identity.id,
            tenant_id: identity.tenant_id,
            email: identity.email.clone(),
            iat,
            exp: iat + ttl.num_seconds(),
        };
        let token = format!("session-{}", uuid::Uuid::new_v4());
        self.issued
            .lock()
            .map_err(|e| SessionError::UnexpectedError(e.to_string()))?
            .insert(token.clone(), claims.clone());
        Ok(IssuedSession {
            token: SessionToken::new(token),
            claims,
        })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let claims = self
            .issued
            .lock()
            .map_err(|e| SessionError::UnexpectedError(e.to_string()))?
            .get(token)
            .cloned()
            .ok_or(SessionError::InvalidSignature)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}
