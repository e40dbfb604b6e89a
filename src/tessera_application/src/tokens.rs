use chrono::TimeDelta;
use tessera_core::{IdentityId, SingleUseToken, TokenKind, TokenLedger, TokenValue};

use crate::error::AuthError;

/// Issue a token of `kind`, first invalidating the owner's outstanding ones
/// so only the newest is ever valid. The cleanup is best-effort: a failure is
/// logged and issuance proceeds.
pub(crate) async fn issue_superseding<L: TokenLedger>(
    ledger: &L,
    owner_id: IdentityId,
    kind: TokenKind,
    ttl: TimeDelta,
) -> Result<TokenValue, AuthError> {
    if let Err(e) = ledger.delete_by_owner_and_type(owner_id, kind).await {
        tracing::warn!(
            error = %e,
            owner_id = %owner_id,
            kind = %kind,
            "failed to delete superseded tokens"
        );
    }

    Ok(ledger.create(owner_id, kind, ttl).await?)
}

/// Consume `value` and require it to be of `kind`. Unknown, expired, used and
/// wrong-kind tokens all yield `InvalidOrExpired`.
pub(crate) async fn consume_of_kind<L: TokenLedger>(
    ledger: &L,
    value: &TokenValue,
    kind: TokenKind,
) -> Result<SingleUseToken, AuthError> {
    let token = ledger.consume(value).await?;
    if token.kind != kind {
        tracing::warn!(
            expected = %kind,
            actual = %token.kind,
            "token presented to the wrong flow"
        );
        return Err(AuthError::InvalidOrExpired);
    }
    Ok(token)
}
