use chrono::{TimeDelta, Utc};
use secrecy::Secret;
use tessera_core::{
    CredentialHasher, Email, Identity, IdentityStore, IdentityStoreError, Password, TenantId,
    TokenKind, TokenLedger, TokenValue,
};

use crate::{
    error::AuthError,
    tokens::{consume_of_kind, issue_superseding},
};

pub const PASSWORD_RESET_TTL_HOURS: i64 = 1;

/// Password reset use case - forgotten-password recovery over a delivered token
pub struct PasswordResetUseCase<I, L, H>
where
    I: IdentityStore,
    L: TokenLedger,
    H: CredentialHasher,
{
    identities: I,
    ledger: L,
    hasher: H,
}

impl<I, L, H> PasswordResetUseCase<I, L, H>
where
    I: IdentityStore,
    L: TokenLedger,
    H: CredentialHasher,
{
    pub fn new(identities: I, ledger: L, hasher: H) -> Self {
        Self {
            identities,
            ledger,
            hasher,
        }
    }

    /// Issue a reset token for delivery. `Ok(None)` for unknown emails, so the
    /// caller can answer identically either way.
    #[tracing::instrument(name = "PasswordResetUseCase::request", skip(self, email))]
    pub async fn request(
        &self,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<Option<TokenValue>, AuthError> {
        let email = Email::parse(email)?;

        let identity = match self.identities.get_by_email_in_tenant(tenant_id, &email).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => {
                tracing::info!("password reset requested for unknown email");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let token = issue_superseding(
            &self.ledger,
            identity.id,
            TokenKind::PasswordReset,
            TimeDelta::hours(PASSWORD_RESET_TTL_HOURS),
        )
        .await?;
        Ok(Some(token))
    }

    /// Redeem a reset token and set the new password.
    ///
    /// The new password is checked before the token is consumed, so a policy
    /// rejection leaves the token usable for another attempt.
    #[tracing::instrument(name = "PasswordResetUseCase::complete", skip_all)]
    pub async fn complete(
        &self,
        raw_token: &TokenValue,
        new_password: Secret<String>,
    ) -> Result<Identity, AuthError> {
        let new_password = Password::try_from(new_password)?;

        let token = consume_of_kind(&self.ledger, raw_token, TokenKind::PasswordReset).await?;

        let mut identity = match self.identities.get_by_id(token.owner_id).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidOrExpired),
            Err(e) => return Err(e.into()),
        };

        identity.password_hash = Some(self.hasher.hash(new_password).await?);
        identity.updated_at = Utc::now();
        self.identities.update(&identity).await?;

        tracing::info!(identity_id = %identity.id, "password reset completed");
        Ok(identity.without_credentials())
    }
}
