use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use secrecy::ExposeSecret;
use tessera_core::{
    IdentityId, SingleUseToken, TokenKind, TokenLedger, TokenLedgerError, TokenValue,
};

/// In-memory token ledger keyed by raw token value.
///
/// `consume` holds the shard write lock for the whole check-and-mark, which
/// makes it atomic per value.
#[derive(Default, Clone)]
pub struct DashMapTokenLedger {
    tokens: Arc<DashMap<String, SingleUseToken>>,
}

impl DashMapTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop tokens that can no longer be consumed. Returns how many were removed.
    pub fn purge_unusable(&self) -> u64 {
        let now = Utc::now();
        let mut removed = 0;
        self.tokens.retain(|_, token| {
            let keep = token.is_usable_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

#[async_trait::async_trait]
impl TokenLedger for DashMapTokenLedger {
    async fn create(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
        ttl: TimeDelta,
    ) -> Result<TokenValue, TokenLedgerError> {
        let token = SingleUseToken::issue(owner_id, kind, ttl, Utc::now());
        let value = token.value.clone();

        match self.tokens.entry(value.expose_secret().clone()) {
            Entry::Vacant(entry) => {
                entry.insert(token);
                Ok(value)
            }
            Entry::Occupied(_) => Err(TokenLedgerError::UnexpectedError(
                "token value collision".to_owned(),
            )),
        }
    }

    async fn consume(&self, value: &TokenValue) -> Result<SingleUseToken, TokenLedgerError> {
        let now = Utc::now();
        let mut token = self
            .tokens
            .get_mut(value.expose_secret())
            .ok_or(TokenLedgerError::NotFound)?;

        if !token.is_usable_at(now) {
            return Err(TokenLedgerError::NotFound);
        }
        token.consumed_at = Some(now);
        Ok(token.clone())
    }

    async fn delete_by_owner_and_type(
        &self,
        owner_id: IdentityId,
        kind: TokenKind,
    ) -> Result<u64, TokenLedgerError> {
        let mut removed = 0;
        self.tokens.retain(|_, token| {
            let keep = !(token.owner_id == owner_id && token.kind == kind);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
