use chrono::{TimeDelta, Utc};
use tessera_core::{
    Identity, IdentityId, IdentityStore, IdentityStoreError, TokenKind, TokenLedger, TokenValue,
};

use crate::{
    error::AuthError,
    tokens::{consume_of_kind, issue_superseding},
};

pub const EMAIL_VERIFICATION_TTL_HOURS: i64 = 24;

/// Email verification use case - proves the identity controls its address
pub struct EmailVerificationUseCase<I, L>
where
    I: IdentityStore,
    L: TokenLedger,
{
    identities: I,
    ledger: L,
}

impl<I, L> EmailVerificationUseCase<I, L>
where
    I: IdentityStore,
    L: TokenLedger,
{
    pub fn new(identities: I, ledger: L) -> Self {
        Self { identities, ledger }
    }

    /// Issue a verification token, replacing any outstanding one.
    #[tracing::instrument(name = "EmailVerificationUseCase::issue", skip(self))]
    pub async fn issue(&self, identity_id: IdentityId) -> Result<TokenValue, AuthError> {
        let identity = self.identities.get_by_id(identity_id).await?;

        issue_superseding(
            &self.ledger,
            identity.id,
            TokenKind::EmailVerify,
            TimeDelta::hours(EMAIL_VERIFICATION_TTL_HOURS),
        )
        .await
    }

    #[tracing::instrument(name = "EmailVerificationUseCase::confirm", skip_all)]
    pub async fn confirm(&self, raw_token: &TokenValue) -> Result<Identity, AuthError> {
        let token = consume_of_kind(&self.ledger, raw_token, TokenKind::EmailVerify).await?;

        let mut identity = match self.identities.get_by_id(token.owner_id).await {
            Ok(identity) => identity,
            Err(IdentityStoreError::NotFound) => return Err(AuthError::InvalidOrExpired),
            Err(e) => return Err(e.into()),
        };

        if !identity.is_email_verified() {
            let now = Utc::now();
            identity.email_verified_at = Some(now);
            identity.updated_at = now;
            self.identities.update(&identity).await?;
        }

        Ok(identity.without_credentials())
    }
}
