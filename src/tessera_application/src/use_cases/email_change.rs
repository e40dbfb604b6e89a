use chrono::{TimeDelta, Utc};
use tessera_core::{
    Email, Identity, IdentityId, IdentityStore, IdentityStoreError, TokenKind, TokenLedger,
    TokenValue,
};

use crate::{
    error::AuthError,
    tokens::{consume_of_kind, issue_superseding},
};

pub const EMAIL_CHANGE_TTL_HOURS: i64 = 24;

/// Email change use case - moves an identity to a new address once the new
/// address is proven
pub struct EmailChangeUseCase<I, L>
where
    I: IdentityStore,
    L: TokenLedger,
{
    identities: I,
    ledger: L,
}

impl<I, L> EmailChangeUseCase<I, L>
where
    I: IdentityStore,
    L: TokenLedger,
{
    pub fn new(identities: I, ledger: L) -> Self {
        Self { identities, ledger }
    }

    /// Record `new_email` as pending and issue a token for delivery to it.
    /// Fails with `DuplicateIdentity` if the address is already used in the
    /// identity's tenant.
    #[tracing::instrument(name = "EmailChangeUseCase::request", skip(self, new_email))]
    pub async fn request(
        &self,
        identity_id: IdentityId,
        new_email: &str,
    ) -> Result<TokenValue, AuthError> {
        let new_email = Email::parse(new_email)?;
        let mut identity = self.identities.get_by_id(identity_id).await?;

        match self
            .identities
            .get_by_email_in_tenant(identity.tenant_id, &new_email)
            .await
        {
            Ok(_) => return Err(AuthError::DuplicateIdentity),
            Err(IdentityStoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        identity.pending_email = Some(new_email);
        identity.updated_at = Utc::now();
        self.identities.update(&identity).await?;

        issue_superseding(
            &self.ledger,
            identity.id,
            TokenKind::EmailChange,
            TimeDelta::hours(EMAIL_CHANGE_TTL_HOURS),
        )
        .await
    }

    /// Redeem an email-change token: the pending address becomes the
    /// identity's verified email.
    #[tracing::instrument(name = "EmailChangeUseCase::confirm", skip_all)]
    pub async fn confirm(&self, raw_token: &TokenValue) -> Result<Identity, AuthError> {
        let token = consume_of_kind(&self.ledger, raw_token, TokenKind::EmailChange).await?;

        let mut identity = match self.identities.get_by_id(token.owner_id).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidOrExpired),
            Err(e) => return Err(e.into()),
        };

        let Some(new_email) = identity.pending_email.take() else {
            return Err(AuthError::InvalidOrExpired);
        };

        let now = Utc::now();
        identity.email = new_email;
        identity.email_verified_at = Some(now);
        identity.updated_at = now;
        self.identities.update(&identity).await?;

        tracing::info!(identity_id = %identity.id, "email changed");
        Ok(identity.without_credentials())
    }
}
