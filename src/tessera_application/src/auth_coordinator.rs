use chrono::{TimeDelta, Utc};
use tessera_core::{
    CredentialHasher, Email, Identity, IdentityStore, IdentityStoreError, IssuedSession, Password,
    SessionCodec, Tenant, TenantId, TenantStore, TenantStoreError, TokenKind, TokenLedger,
    TokenValue,
};

use crate::{
    error::AuthError,
    tokens::{consume_of_kind, issue_superseding},
};

pub const MAGIC_LINK_TTL_MINUTES: i64 = 15;

/// The caller behind a verified session cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    /// Never carries a password hash.
    pub identity: Identity,
    pub tenant: Tenant,
}

/// Orchestrates credential login, magic links and session lifecycle over the
/// identity store, tenant store, token ledger, hasher and session codec.
pub struct AuthCoordinator<I, T, L, H, S>
where
    I: IdentityStore,
    T: TenantStore,
    L: TokenLedger,
    H: CredentialHasher,
    S: SessionCodec,
{
    identities: I,
    tenants: T,
    ledger: L,
    hasher: H,
    sessions: S,
    session_ttl: TimeDelta,
}

impl<I, T, L, H, S> AuthCoordinator<I, T, L, H, S>
where
    I: IdentityStore,
    T: TenantStore,
    L: TokenLedger,
    H: CredentialHasher,
    S: SessionCodec,
{
    pub fn new(
        identities: I,
        tenants: T,
        ledger: L,
        hasher: H,
        sessions: S,
        session_ttl: TimeDelta,
    ) -> Self {
        Self {
            identities,
            tenants,
            ledger,
            hasher,
            sessions,
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> TimeDelta {
        self.session_ttl
    }

    /// Credential login within one tenant.
    ///
    /// Unknown emails, malformed emails and wrong passwords all yield
    /// `InvalidCredentials`. A passwordless account yields `PasswordlessAccount`
    /// and a correct password on an unverified account yields `EmailNotVerified`.
    #[tracing::instrument(name = "AuthCoordinator::login", skip(self, email, password))]
    pub async fn login(
        &self,
        tenant_id: TenantId,
        email: &str,
        password: Password,
    ) -> Result<Identity, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let identity = match self.identities.get_by_email_in_tenant(tenant_id, &email).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let Some(expected) = identity.password_hash.clone().filter(|_| identity.has_password())
        else {
            return Err(AuthError::PasswordlessAccount);
        };

        if !self.hasher.verify(password, expected).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !identity.is_email_verified() {
            return Err(AuthError::EmailNotVerified);
        }

        tracing::info!(identity_id = %identity.id, "credential login succeeded");
        Ok(identity.without_credentials())
    }

    /// Issue a magic-link token for delivery. Replaces any outstanding magic
    /// links of the identity.
    ///
    /// Reports `NotFound` for unknown emails; public surfaces should call
    /// [`Self::request_magic_link`] instead.
    #[tracing::instrument(name = "AuthCoordinator::send_magic_link", skip(self, email))]
    pub async fn send_magic_link(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<TokenValue, AuthError> {
        let email = Email::parse(email)?;
        let identity = self
            .identities
            .get_by_email_in_tenant(tenant_id, &email)
            .await?;

        issue_superseding(
            &self.ledger,
            identity.id,
            TokenKind::MagicLink,
            TimeDelta::minutes(MAGIC_LINK_TTL_MINUTES),
        )
        .await
    }

    /// Like [`Self::send_magic_link`], but an unknown email is `Ok(None)`, so
    /// the response does not reveal whether an account exists.
    #[tracing::instrument(name = "AuthCoordinator::request_magic_link", skip(self, email))]
    pub async fn request_magic_link(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<Option<TokenValue>, AuthError> {
        match self.send_magic_link(tenant_id, email).await {
            Ok(token) => Ok(Some(token)),
            Err(AuthError::NotFound) => {
                tracing::info!("magic link requested for unknown email");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Redeem a magic link. Every failure to redeem is `InvalidOrExpired`.
    ///
    /// An unverified email is marked verified on success, since following the
    /// link proves ownership. That write is best-effort: if it fails the
    /// login still succeeds and the identity is returned unverified.
    #[tracing::instrument(name = "AuthCoordinator::verify_magic_link", skip_all)]
    pub async fn verify_magic_link(&self, raw_token: &TokenValue) -> Result<Identity, AuthError> {
        let token = consume_of_kind(&self.ledger, raw_token, TokenKind::MagicLink).await?;

        let mut identity = match self.identities.get_by_id(token.owner_id).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidOrExpired),
            Err(e) => return Err(e.into()),
        };

        if !identity.is_email_verified() {
            let now = Utc::now();
            let mut verified = identity.clone();
            verified.email_verified_at = Some(now);
            verified.updated_at = now;
            match self.identities.update(&verified).await {
                Ok(()) => identity = verified,
                Err(e) => tracing::warn!(
                    error = %e,
                    identity_id = %identity.id,
                    "failed to mark email verified after magic link"
                ),
            }
        }

        tracing::info!(identity_id = %identity.id, "magic link redeemed");
        Ok(identity.without_credentials())
    }

    /// Sign a session for an authenticated identity.
    pub fn start_session(&self, identity: &Identity) -> Result<IssuedSession, AuthError> {
        Ok(self.sessions.issue(identity, self.session_ttl)?)
    }

    /// Resolve a presented session token to its identity and tenant.
    ///
    /// Fails if the signature or expiry is bad, the identity no longer exists
    /// or has moved tenant, or the tenant is no longer active.
    #[tracing::instrument(name = "AuthCoordinator::resume_session", skip_all)]
    pub async fn resume_session(&self, token: &str) -> Result<AuthenticatedContext, AuthError> {
        let claims = self.sessions.verify(token)?;

        let identity = match self.identities.get_by_id(claims.sub).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };
        if identity.tenant_id != claims.tenant_id {
            return Err(AuthError::InvalidCredentials);
        }

        let tenant = match self.tenants.get_by_id(claims.tenant_id).await {
            Ok(tenant) => tenant,
            Err(TenantStoreError::NotFound) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };
        if !tenant.is_active() {
            return Err(AuthError::InactiveTenant);
        }

        Ok(AuthenticatedContext {
            identity: identity.without_credentials(),
            tenant,
        })
    }
}
